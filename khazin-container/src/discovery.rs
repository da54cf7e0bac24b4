//! Type discovery for autoloading.
//!
//! Every `#[derive(Injectable)]` type submits a [`Discoverable`] entry to a
//! link-time catalog, tagged with the source file it was defined in.
//! Discovery walks a directory tree and keeps the catalog entries whose
//! source file lies inside it, so "register everything under `services/`"
//! works without any runtime code loading.
//!
//! # Examples
//! ```rust,ignore
//! let container = Container::new();
//! container.bind("UserRepository", repository_descriptor());
//!
//! // Registers UserService, UserController, ... but keeps the binding above.
//! let registered = container.autoload("src/services").await?;
//! ```

use std::path::Path;

use crate::descriptor::TypeDescriptor;

/// One catalog entry, submitted by `#[derive(Injectable)]`.
#[derive(Debug, Clone, Copy)]
pub struct Discoverable {
    /// Builds the type's descriptor.
    pub describe: fn() -> TypeDescriptor,
    /// `file!()` at the definition site.
    pub source_file: &'static str,
    /// `module_path!()` at the definition site.
    pub module_path: &'static str,
}

impl Discoverable {
    pub const fn new(
        describe: fn() -> TypeDescriptor,
        source_file: &'static str,
        module_path: &'static str,
    ) -> Self {
        Self {
            describe,
            source_file,
            module_path,
        }
    }

    /// Returns `true` if this entry was defined in `file`.
    ///
    /// `file!()` is relative to the workspace (or package) root, so an
    /// absolute path matches when it ends with the recorded components.
    pub fn defined_in(&self, file: &Path) -> bool {
        file.ends_with(self.source_file)
    }
}

inventory::collect!(Discoverable);

/// Every catalog entry linked into this binary.
pub fn catalog() -> impl Iterator<Item = &'static Discoverable> {
    inventory::iter::<Discoverable>.into_iter()
}

#[cfg(feature = "async")]
pub use self::source_tree::{Discover, SourceTreeDiscovery};

#[cfg(feature = "async")]
mod source_tree {
    use std::path::{Path, PathBuf};

    use async_trait::async_trait;
    use tracing::{debug, info, instrument, trace, warn};

    use super::catalog;
    use crate::container::{Container, self_named};
    use crate::descriptor::TypeDescriptor;
    use crate::error::{ContainerError, Result};
    use crate::key::normalize;
    use crate::lifetime::Lifetime;

    /// Finds constructible types under a directory.
    #[async_trait]
    pub trait Discover: Send + Sync {
        /// Descriptors of the types defined under `root`.
        ///
        /// # Errors
        /// [`ContainerError::Discovery`] if the tree can't be read.
        async fn discover(&self, root: &Path) -> Result<Vec<TypeDescriptor>>;
    }

    /// Matches the derive catalog against the files of a source tree.
    #[derive(Debug, Clone)]
    pub struct SourceTreeDiscovery {
        extensions: Vec<String>,
    }

    impl Default for SourceTreeDiscovery {
        fn default() -> Self {
            Self {
                extensions: vec!["rs".to_string()],
            }
        }
    }

    impl SourceTreeDiscovery {
        pub fn new() -> Self {
            Self::default()
        }

        /// File extensions considered source files. Defaults to `rs`.
        pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.extensions = extensions.into_iter().map(Into::into).collect();
            self
        }

        fn is_source(&self, path: &Path) -> bool {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| self.extensions.iter().any(|wanted| wanted == ext))
        }

        /// All source files under `root`, depth-first.
        async fn walk(&self, root: &Path) -> Result<Vec<PathBuf>> {
            let mut files = Vec::new();
            let mut pending = vec![root.to_path_buf()];

            while let Some(dir) = pending.pop() {
                let mut entries = tokio::fs::read_dir(&dir)
                    .await
                    .map_err(|source| discovery_error(&dir, source))?;

                while let Some(entry) = entries
                    .next_entry()
                    .await
                    .map_err(|source| discovery_error(&dir, source))?
                {
                    let path = entry.path();
                    let file_type = entry
                        .file_type()
                        .await
                        .map_err(|source| discovery_error(&path, source))?;

                    if file_type.is_dir() {
                        pending.push(path);
                    } else if self.is_source(&path) {
                        trace!(path = %path.display(), "Found source file");
                        files.push(path);
                    }
                }
            }
            Ok(files)
        }
    }

    /// Sorts by normalized name and keeps one descriptor per name.
    ///
    /// Ties are broken by type name, so the survivor doesn't depend on
    /// link order.
    pub(super) fn dedup_by_name(mut descriptors: Vec<TypeDescriptor>) -> Vec<TypeDescriptor> {
        descriptors.sort_by_cached_key(|descriptor| (normalize(descriptor.name()), descriptor.type_name()));
        descriptors.dedup_by(|later, kept| {
            let same = normalize(later.name()) == normalize(kept.name());
            if same {
                warn!(
                    name = kept.name(),
                    kept = kept.type_name(),
                    dropped = later.type_name(),
                    "Discovered types share a name, keeping one"
                );
            }
            same
        });
        descriptors
    }

    fn discovery_error(path: &Path, source: std::io::Error) -> ContainerError {
        ContainerError::Discovery {
            path: path.to_path_buf(),
            source,
        }
    }

    #[async_trait]
    impl Discover for SourceTreeDiscovery {
        #[instrument(skip_all, fields(root = %root.display()))]
        async fn discover(&self, root: &Path) -> Result<Vec<TypeDescriptor>> {
            let root = tokio::fs::canonicalize(root)
                .await
                .map_err(|source| discovery_error(root, source))?;
            let files = self.walk(&root).await?;

            let descriptors: Vec<TypeDescriptor> = catalog()
                .filter(|entry| files.iter().any(|file| entry.defined_in(file)))
                .map(|entry| {
                    trace!(module = entry.module_path, file = entry.source_file, "Discovered");
                    (entry.describe)()
                })
                .collect();

            let descriptors = dedup_by_name(descriptors);

            debug!(files = files.len(), types = descriptors.len(), "Discovery finished");
            Ok(descriptors)
        }
    }

    impl Container {
        /// Registers every derived type defined under `root`.
        ///
        /// Names that are already bound are left alone, so contract bindings
        /// made beforehand take precedence. Returns how many types were
        /// newly registered.
        ///
        /// # Errors
        /// [`ContainerError::Discovery`] if the tree can't be read.
        pub async fn autoload(&self, root: impl AsRef<Path>) -> Result<usize> {
            self.autoload_with(root.as_ref(), &SourceTreeDiscovery::default())
                .await
        }

        /// Like [`Container::autoload`], with a custom discovery adapter.
        #[instrument(skip_all, fields(root = %root.display()))]
        pub async fn autoload_with(&self, root: &Path, discoverer: &dyn Discover) -> Result<usize> {
            let descriptors = discoverer.discover(root).await?;

            let mut registered = 0;
            let mut skipped = 0;
            for descriptor in descriptors {
                match self.registry().try_insert(self_named(Lifetime::Transient, descriptor)) {
                    Ok(()) => registered += 1,
                    Err(ContainerError::DuplicateBinding(err)) => {
                        debug!(key = %err.name, "Already bound, skipping");
                        skipped += 1;
                    }
                    Err(err) => return Err(err),
                }
            }

            info!(registered, skipped, "Autoload finished");
            Ok(registered)
        }

        /// Autoloads from [`ContainerOptions::autoload_root`], if set.
        ///
        /// [`ContainerOptions::autoload_root`]: crate::container::ContainerOptions::autoload_root
        pub async fn autoload_configured(&self) -> Result<usize> {
            match self.options().autoload_root.clone() {
                Some(root) => self.autoload(root).await,
                None => {
                    debug!("No autoload root configured");
                    Ok(0)
                }
            }
        }
    }
}
