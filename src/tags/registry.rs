use std::{collections::HashMap, sync::Arc};

use log::debug;
use static_assertions::assert_impl_all;

use crate::error::RegistryError;

use super::{ErroneousTextTag, NewlineTag, RootTag, TagRef, TextTag, RESERVED_PREFIX};

/// Maps tag names and aliases to their descriptors.
///
/// Read-only once built, so one registry can serve parses on any number of threads.
#[derive(Debug, Clone)]
pub struct TagRegistry {
    tags: HashMap<String, TagRef>,
    root: TagRef,
    text: TagRef,
    newline: TagRef,
    erroneous: TagRef,
}

assert_impl_all!(TagRegistry: Send, Sync);

impl TagRegistry {
    /// Registers every descriptor under its canonical name and aliases.
    pub fn new<I>(descriptors: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = TagRef>,
    {
        let mut tags: HashMap<String, TagRef> = HashMap::new();

        for tag in descriptors {
            let name = tag.name().to_ascii_lowercase();
            if name.is_empty() {
                return Err(RegistryError::MissingName);
            }
            if name.starts_with(RESERVED_PREFIX) {
                return Err(RegistryError::ReservedName(name));
            }
            if tags.contains_key(&name) {
                return Err(RegistryError::DuplicateName(name));
            }

            debug!("registering tag `{name}`");
            for alias in tag.aliases() {
                let alias = alias.to_ascii_lowercase();
                if alias.starts_with(RESERVED_PREFIX) {
                    return Err(RegistryError::ReservedName(alias));
                }
                if alias == name || tags.contains_key(&alias) {
                    return Err(RegistryError::DuplicateAlias(alias));
                }
                tags.insert(alias, Arc::clone(&tag));
            }
            tags.insert(name, tag);
        }

        Ok(Self {
            tags,
            ..Self::default()
        })
    }

    /// A registry holding [builtins::default_tags][super::builtins::default_tags].
    #[cfg(feature = "builtin_tags")]
    pub fn with_builtins() -> Self {
        Self::new(super::builtins::default_tags())
            .unwrap_or_else(|err| panic!("built-in tag set is inconsistent: {err}"))
    }

    /// Replaces the descriptor used for erroneous text, e.g. with
    /// [ErroneousTextTag::flagged].
    pub fn with_erroneous(mut self, erroneous: TagRef) -> Self {
        self.erroneous = erroneous;
        self
    }

    pub fn get(&self, name: &str) -> Option<&TagRef> {
        self.tags.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Number of registered names, aliases included.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn root(&self) -> &TagRef {
        &self.root
    }

    pub fn text(&self) -> &TagRef {
        &self.text
    }

    pub fn newline(&self) -> &TagRef {
        &self.newline
    }

    pub fn erroneous(&self) -> &TagRef {
        &self.erroneous
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self {
            tags: HashMap::new(),
            root: Arc::new(RootTag),
            text: Arc::new(TextTag),
            newline: Arc::new(NewlineTag),
            erroneous: Arc::new(ErroneousTextTag::default()),
        }
    }
}
