//! Ordered build stages.

use crate::BuildError;
use crate::context::BuildContext;
use crate::stages::{
    ApiPagesFinished, BuildFinished, BuilderInited, ConfigInited, DoctreeRead, EnvUpdated, HtmlPageContext,
};

/// One step of the build.
pub trait Stage {
    /// Event name, used in logs.
    fn name(&self) -> &'static str;

    /// Run the stage.
    ///
    /// # Errors
    ///
    /// Any error aborts the build; later stages do not run.
    fn run(&self, ctx: &mut BuildContext) -> Result<(), BuildError>;
}

/// Stages run in insertion order over one [`BuildContext`].
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The full site build: `config-inited`, `builder-inited`,
    /// `doctree-read`, `env-updated`, `html-page-context`, `build-finished`,
    /// then the API page repair.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with_stage(ConfigInited)
            .with_stage(BuilderInited)
            .with_stage(DoctreeRead)
            .with_stage(EnvUpdated)
            .with_stage(HtmlPageContext)
            .with_stage(BuildFinished)
            .with_stage(ApiPagesFinished)
    }

    /// Append a stage.
    #[must_use]
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run every stage, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the error of the failing stage.
    pub fn run(&self, ctx: &mut BuildContext) -> Result<(), BuildError> {
        self.run_observed(ctx, |_| {})
    }

    /// Like [`run`](Self::run), calling `observe` with each stage name
    /// before the stage runs.
    ///
    /// # Errors
    ///
    /// Returns the error of the failing stage.
    pub fn run_observed(
        &self,
        ctx: &mut BuildContext,
        mut observe: impl FnMut(&'static str),
    ) -> Result<(), BuildError> {
        for stage in &self.stages {
            observe(stage.name());
            tracing::debug!(stage = stage.name(), "Running stage");
            stage.run(ctx).inspect_err(|e| {
                tracing::debug!(stage = stage.name(), error = %e, "Stage failed");
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use vellum_config::Config;

    struct Record(&'static str);

    impl Stage for Record {
        fn name(&self) -> &'static str {
            self.0
        }

        fn run(&self, ctx: &mut BuildContext) -> Result<(), BuildError> {
            ctx.pages.push(self.0.to_owned());
            Ok(())
        }
    }

    struct Fail;

    impl Stage for Fail {
        fn name(&self) -> &'static str {
            "fail"
        }

        fn run(&self, _ctx: &mut BuildContext) -> Result<(), BuildError> {
            Err(BuildError::Io {
                path: "x".into(),
                source: std::io::Error::other("boom"),
            })
        }
    }

    #[test]
    fn test_standard_stage_order() {
        assert_eq!(
            Pipeline::standard().stage_names(),
            vec![
                "config-inited",
                "builder-inited",
                "doctree-read",
                "env-updated",
                "html-page-context",
                "build-finished",
                "api-pages-finished",
            ]
        );
    }

    #[test]
    fn test_run_stops_at_first_error() {
        let mut ctx = BuildContext::new(Config::default_with_base(Path::new("/p")));
        let pipeline = Pipeline::new()
            .with_stage(Record("a"))
            .with_stage(Fail)
            .with_stage(Record("b"));

        assert!(pipeline.run(&mut ctx).is_err());
        assert_eq!(ctx.pages, vec!["a".to_owned()]);
    }

    #[test]
    fn test_run_observed_reports_started_stages() {
        let mut ctx = BuildContext::new(Config::default_with_base(Path::new("/p")));
        let pipeline = Pipeline::new()
            .with_stage(Record("a"))
            .with_stage(Fail)
            .with_stage(Record("b"));
        let mut started = Vec::new();

        assert!(pipeline.run_observed(&mut ctx, |name| started.push(name)).is_err());
        assert_eq!(started, vec!["a", "fail"]);
    }
}
