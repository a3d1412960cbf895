/// Build a `PathBuf` by pushing each component in turn.
#[macro_export]
#[doc(hidden)]
macro_rules! pathbuf {
    ( $( $part:expr ),+ $(,)? ) => {{
        let mut path = ::std::path::PathBuf::new();

        $(
            path.push($part);
        )+

        path
    }};
}
