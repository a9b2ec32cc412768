use std::fmt;

#[derive(Debug)]
pub struct Grammar {
    pub rules: Vec<Rule>,
}

#[derive(Debug)]
pub struct Rule {
    pub name: String,
    pub entrypoint: bool,
    pub alternatives: Vec<Alternative>,
}

/// One alternative of a rule. An empty item list is the `ε` alternative.
#[derive(Debug)]
pub struct Alternative {
    pub action: Option<String>,
    pub items: Vec<Item>,
}

#[derive(Debug)]
pub struct Item {
    pub captured: bool,
    pub expr: Expr,
    pub quantifiers: Vec<Quantifier>,
}

#[derive(Debug)]
pub enum Expr {
    Name(String),
    Literal(String),
    Group(Vec<Alternative>),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Quantifier {
    Optional,
    ZeroOrMore,
    OneOrMore,
}

// The textual forms below double as the names of synthetic nonterminals,
// so structurally equal sub-expressions render identically.

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return f.write_str("ε");
        }
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", item)?;
        }
        Ok(())
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.captured {
            f.write_str("!")?;
        }
        write!(f, "{}", self.expr)?;
        for quantifier in &self.quantifiers {
            write!(f, "{}", quantifier)?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Literal(text) => write!(f, "'{}'", text),
            Self::Group(alternatives) => {
                f.write_str("(")?;
                for (i, alternative) in alternatives.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", alternative)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Optional => "?",
            Self::ZeroOrMore => "*",
            Self::OneOrMore => "+",
        })
    }
}
