use core::fmt::Display;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    ArgumentErr(String),
    UnsupportedErr(String),
    ConfErr(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ArgumentErr(err) | Self::UnsupportedErr(err) | Self::ConfErr(err) => {
                write!(f, "{}", err)
            }
        }
    }
}
