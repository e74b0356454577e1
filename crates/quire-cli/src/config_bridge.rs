//! Bridge from `quire_config::Config` to runtime types.

use std::sync::Arc;

use quire_authz::{AclCache, DecisionEngine, DecisionSink, MemoryRepository, NullSink, TracingSink};
use quire_config::{AuditSinkKind, Config};
use quire_core::PrincipalParser;
use quire_telemetry::{LogConfig, LogFormat};

/// Convert config to a [`LogConfig`]. Unknown formats fall back to compact.
pub(crate) fn to_log_config(cfg: &Config) -> LogConfig {
    let format = cfg
        .logging
        .format
        .parse::<LogFormat>()
        .unwrap_or(LogFormat::Compact);

    cfg.logging
        .directives
        .iter()
        .fold(LogConfig::new(&cfg.logging.level).with_format(format), |lc, d| {
            lc.with_directive(d)
        })
}

pub(crate) fn to_parser(cfg: &Config) -> PrincipalParser {
    PrincipalParser::new(&cfg.engine.everyone_principal)
}

/// The audit sink selected by `[audit]`.
pub(crate) fn to_sink(cfg: &Config) -> Arc<dyn DecisionSink> {
    if !cfg.audit.enabled {
        return Arc::new(NullSink);
    }
    match cfg.audit.sink {
        AuditSinkKind::Tracing => Arc::new(TracingSink),
        AuditSinkKind::None => Arc::new(NullSink),
    }
}

/// A cache sized by `[cache]`, or `None` when caching is off.
pub(crate) fn to_cache(cfg: &Config) -> Option<Arc<AclCache>> {
    cfg.cache
        .enabled
        .then(|| Arc::new(AclCache::new(cfg.cache.max_entries)))
}

/// Build an engine over `repo` with every configured option applied.
///
/// A configured cache is subscribed to `repo` before it is handed to the
/// engine.
pub(crate) fn build_engine(cfg: &Config, repo: &Arc<MemoryRepository>) -> DecisionEngine {
    let engine = DecisionEngine::new(repo.clone(), repo.clone())
        .with_parser(to_parser(cfg))
        .with_sink(to_sink(cfg));
    match to_cache(cfg) {
        Some(cache) => {
            repo.subscribe(cache.clone());
            engine.with_cache(cache)
        },
        None => engine,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_core::Operation;
    use quire_test::{test_path, test_reader, test_roles_repository};

    #[test]
    fn test_log_config_from_defaults() {
        let mut cfg = Config::default();
        cfg.logging.format = "json".to_owned();
        cfg.logging.directives = vec!["quire::audit=info".to_owned()];

        let lc = to_log_config(&cfg);
        assert_eq!(lc.level, "warn");
        assert_eq!(lc.format, LogFormat::Json);
        assert_eq!(lc.directives, vec!["quire::audit=info".to_owned()]);
    }

    #[test]
    fn test_cache_only_when_enabled() {
        let mut cfg = Config::default();
        assert!(to_cache(&cfg).is_none());
        cfg.cache.enabled = true;
        cfg.cache.max_entries = 7;
        assert_eq!(to_cache(&cfg).unwrap().max_entries(), 7);
    }

    #[test]
    fn test_parser_uses_configured_token() {
        let mut cfg = Config::default();
        cfg.engine.everyone_principal = "*".to_owned();
        assert_eq!(to_parser(&cfg).everyone_token(), "*");
    }

    #[tokio::test]
    async fn test_built_engine_cache_is_subscribed() {
        let mut cfg = Config::default();
        cfg.cache.enabled = true;
        let repo = test_roles_repository();
        let engine = build_engine(&cfg, &repo);
        let target = test_path("/testparent3/testchild3b");

        let before = engine.decide(&test_reader(), &target, Operation::Read).await.unwrap();
        assert!(before.is_allowed());
        assert_eq!(engine.cache().unwrap().len(), 1);

        repo.set_acl(&test_path("/testparent3"), Vec::new()).unwrap();
        let after = engine.decide(&test_reader(), &target, Operation::Read).await.unwrap();
        assert!(!after.is_allowed());
    }
}
