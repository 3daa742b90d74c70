use serde_derive::{Deserialize, Serialize};
use std::{
    fmt::{self, Display, Formatter},
    ops::Deref,
    str::FromStr,
};

/// A unique resource identifier, as handed out by the server.
#[derive(
    Debug, Clone, PartialEq, Hash, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Id(String);

impl<S: Into<String>> From<S> for Id {
    fn from(other: S) -> Id { Id(other.into()) }
}

impl Deref for Id {
    type Target = str;

    fn deref(&self) -> &str { &self.0 }
}

impl FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Id, Self::Err> { Ok(Id::from(s)) }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}
