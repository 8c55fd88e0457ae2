//! Repository layer configuration.

use crate::errors::{ArtemisError, ArtemisResult, ErrorKind};
use crate::query::ConsistencyLevel;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What a repository does when invoked with a method it cannot classify.
///
/// A method is unrecognized when it carries no literal query, is not `save`
/// or `update`, and its name starts with neither `findBy` nor `deleteBy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownMethodPolicy {
    /// Return [Outcome::Null](crate::repository::Outcome::Null); asynchronous
    /// repositories silently do nothing.
    #[default]
    ReturnNull,
    /// Fail with a `DynamicQueryError`.
    Fail,
}

/// Settings shared by every repository of a
/// [RepositoryRegistry](crate::repository::RepositoryRegistry).
///
/// Cheap to clone; clones share the same settings. Settings can only be
/// changed until the registry is built.
#[derive(Clone)]
pub struct RepositoryConfig {
    inner: Arc<RepositoryConfigInner>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryConfig {
    pub fn new() -> Self {
        RepositoryConfig {
            inner: Arc::new(RepositoryConfigInner::new()),
        }
    }

    pub fn unknown_method_policy(&self) -> UnknownMethodPolicy {
        *self.inner.unknown_method_policy.read()
    }

    pub fn set_unknown_method_policy(&self, policy: UnknownMethodPolicy) -> ArtemisResult<()> {
        self.inner.check_not_configured("Unknown method policy")?;
        *self.inner.unknown_method_policy.write() = policy;
        Ok(())
    }

    /// Consistency level set on queries whose invocation does not pass one.
    pub fn default_consistency(&self) -> Option<ConsistencyLevel> {
        *self.inner.default_consistency.read()
    }

    pub fn set_default_consistency(&self, consistency: ConsistencyLevel) -> ArtemisResult<()> {
        self.inner.check_not_configured("Default consistency")?;
        *self.inner.default_consistency.write() = Some(consistency);
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.inner.configured.load(Ordering::Relaxed)
    }

    pub(crate) fn mark_configured(&self) {
        self.inner.configured.store(true, Ordering::Relaxed);
    }
}

struct RepositoryConfigInner {
    configured: AtomicBool,
    unknown_method_policy: RwLock<UnknownMethodPolicy>,
    default_consistency: RwLock<Option<ConsistencyLevel>>,
}

impl RepositoryConfigInner {
    fn new() -> Self {
        RepositoryConfigInner {
            configured: AtomicBool::from(false),
            unknown_method_policy: RwLock::new(UnknownMethodPolicy::default()),
            default_consistency: RwLock::new(None),
        }
    }

    fn check_not_configured(&self, setting: &str) -> ArtemisResult<()> {
        if self.configured.load(Ordering::Relaxed) {
            log::error!("{} cannot be changed after initialization", setting);
            return Err(ArtemisError::new(
                &format!("{} cannot be changed after initialization", setting),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }
}
