use std::fmt;

/// Wrap a formatting closure so that it can be used where `impl Display` is expected.
pub fn display_fn<F>(f: F) -> impl fmt::Display
where
    F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
{
    struct DisplayFn<F>(F);

    impl<F> fmt::Display for DisplayFn<F>
    where
        F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            (self.0)(f)
        }
    }

    DisplayFn(f)
}

/// Render `items` separated by `sep`.
pub fn join<'a, I, T>(items: I, sep: &'a str) -> impl fmt::Display + 'a
where
    I: IntoIterator<Item = T> + Clone + 'a,
    T: fmt::Display,
{
    display_fn(move |f| {
        for (i, item) in items.clone().into_iter().enumerate() {
            if i > 0 {
                f.write_str(sep)?;
            }
            write!(f, "{}", item)?;
        }
        Ok(())
    })
}
