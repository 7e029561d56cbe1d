use crate::commands::error::{CommandError, TreeCommandError};

/// The path walked from the root so far, recorded for usage reconstruction.
///
/// Segments are the root alias, the primary alias of every branch taken and the usage
/// fragment of every accepted argument. Empty fragments are skipped.
#[derive(Debug, Clone)]
pub(super) struct Trail {
    segments: Vec<String>,
}

impl Trail {
    pub fn new(root_alias: &str) -> Self {
        Self {
            segments: vec![root_alias.to_string()],
        }
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        let segment = segment.into();
        if !segment.is_empty() {
            self.segments.push(segment);
        }
    }

    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    /// `/root branch <arg>`, followed by `attempted` when given.
    pub fn usage(&self, attempted: Option<&str>) -> String {
        let mut usage = format!("/{}", self.segments.join(" "));
        if let Some(attempted) = attempted.filter(|attempted| !attempted.is_empty()) {
            usage.push(' ');
            usage.push_str(attempted);
        }
        usage
    }

    /// Decorates `error` with the path walked so far.
    pub fn wrap(
        &self,
        error: CommandError,
        attempted: Option<&str>,
        subcommands: Vec<String>,
    ) -> TreeCommandError {
        TreeCommandError::new(self.root(), self.usage(attempted), subcommands, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_segments() {
        let mut trail = Trail::new("warp");
        trail.push("set");
        trail.push("");
        trail.push("<name>");
        assert_eq!(trail.usage(None), "/warp set <name>");
        assert_eq!(trail.usage(Some("[<public>]")), "/warp set <name> [<public>]");
    }

    #[test]
    fn wraps_with_root_alias() {
        let trail = Trail::new("sum");
        let err = trail.wrap(CommandError::NoExecutor, Some("<value1>"), Vec::new());
        assert_eq!(err.root_alias(), "sum");
        assert_eq!(err.usage(), "/sum <value1>");
    }
}
