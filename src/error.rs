use custom_error::custom_error;

pub type Result<T> = std::result::Result<T, Error>;

custom_error! {pub Error
    Io{source: std::io::Error} = "I/O error",
    Zip{source: zip::result::ZipError} = "zip error"
}

// Per-token diagnostics. None of these abort a route: the offending token is
// skipped (or passed through unexpanded) and the rest of the line continues.
custom_error! {pub RouteIssue
    UnknownToken{token: String}      = "unrecognized token \"{token}\"",
    UnresolvedFix{token: String}     = "no plausible position for fix \"{token}\"",
    ExpansionNotFound{token: String} = "no expansion found for \"{token}\""
}

impl RouteIssue {
    pub fn token(&self) -> &str {
        match self {
            RouteIssue::UnknownToken { token } => token,
            RouteIssue::UnresolvedFix { token } => token,
            RouteIssue::ExpansionNotFound { token } => token,
        }
    }
}
