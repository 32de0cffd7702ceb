use std::fmt;

/// Error type for vinoteca operations
/// Implements Clone so it can travel inside outcomes and reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Invalid configuration value
    InvalidConfiguration(String)
  , /// No response from the upstream (refused, DNS, reset)
    Unreachable(String)
  , /// Upstream did not answer within the request timeout
    Timeout
  , /// Request body could not be decoded
    MalformedInput(String)
  , /// Socket or listener failure
    Io(String)
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Unreachable(msg) => {
              write!(f, "Upstream unreachable: {}", msg)
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::MalformedInput(msg) => {
              write!(f, "Malformed input: {}", msg)
            }
          , Error::Io(msg) => {
              write!(f, "I/O error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::Io(e.to_string())
    }
}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   if e.is_timeout()
        {   Error::Timeout
        } else
        {   Error::Unreachable(e.to_string())
        }
    }
}
