use std::env;
use std::fmt;

use foundry_release_environment::action_input;
use serde::Serialize;

/// Where a GitHub token was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    Flag,
    ActionInput,
    GithubToken,
    GhToken,
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenSource::Flag => "--token",
            TokenSource::ActionInput => "actionToken input",
            TokenSource::GithubToken => "GITHUB_TOKEN",
            TokenSource::GhToken => "GH_TOKEN",
        };
        f.write_str(name)
    }
}

/// Resolve a GitHub token.
///
/// Resolution order:
/// 1) `explicit` (the `--token` flag)
/// 2) the `actionToken` action input (`INPUT_ACTIONTOKEN`)
/// 3) `GITHUB_TOKEN`
/// 4) `GH_TOKEN`
///
/// Blank values are skipped. Returns `None` if nothing is configured.
pub fn resolve_token(explicit: Option<&str>) -> Option<(String, TokenSource)> {
    if let Some(tok) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Some((tok.to_string(), TokenSource::Flag));
    }

    if let Some(tok) = action_input("actionToken") {
        return Some((tok, TokenSource::ActionInput));
    }

    for (var, source) in [
        ("GITHUB_TOKEN", TokenSource::GithubToken),
        ("GH_TOKEN", TokenSource::GhToken),
    ] {
        if let Ok(v) = env::var(var) {
            let v = v.trim().to_string();
            if !v.is_empty() {
                return Some((v, source));
            }
        }
    }

    None
}
