//! Registry of host-supplied commands

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Command {0} already registered.")]
    DuplicateCommand(String),
}

/// A command added by the hosting application
///
/// Receives the raw arguments of the line and may return a message that
/// is reported locally.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn call(&self, args: Vec<String>) -> anyhow::Result<Option<String>>;
}

#[async_trait]
impl<F, Fut> CommandHandler for F
where
    F: Fn(Vec<String>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Option<String>>> + Send + 'static,
{
    async fn call(&self, args: Vec<String>) -> anyhow::Result<Option<String>> {
        (self)(args).await
    }
}

/// Name to handler table for extension commands
#[derive(Default, Clone)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command; a name can only be registered once
    pub fn register<H>(&mut self, name: impl Into<String>, handler: H) -> Result<(), RegistryError>
    where
        H: CommandHandler + 'static,
    {
        let name = name.into();
        if self.commands.contains_key(&name) {
            return Err(RegistryError::DuplicateCommand(name));
        }
        self.commands.insert(name, Arc::new(handler));
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.commands.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn echo(args: Vec<String>) -> anyhow::Result<Option<String>> {
        Ok(Some(args.join(" ")))
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let mut registry = CommandRegistry::new();
        registry.register("echo", echo).unwrap();

        let handler = registry.lookup("echo").expect("echo should be registered");
        let result = handler.call(vec!["a".into(), "b".into()]).await.unwrap();
        assert_eq!(result.as_deref(), Some("a b"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register("echo", echo).unwrap();

        let err = registry
            .register("echo", |_args: Vec<String>| async {
                Ok::<Option<String>, anyhow::Error>(None)
            })
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateCommand("echo".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_missing() {
        let registry = CommandRegistry::new();
        assert!(registry.lookup("nothing").is_none());
        assert!(registry.is_empty());
    }
}
