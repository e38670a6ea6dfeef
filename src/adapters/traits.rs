use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// Startable - Uniform adapter lifecycle trait
// =============================================================================

/// Trait for adapters that can be started/stopped uniformly.
#[async_trait]
pub trait Startable: Send + Sync {
    /// Adapter name used in logs (e.g., "mqtt")
    fn name(&self) -> &'static str;

    /// Start the adapter. No-op if already running or can't start.
    async fn start(&self) -> Result<()>;

    /// Stop the adapter gracefully.
    async fn stop(&self);

    /// Whether this adapter can be started (e.g., has required config).
    async fn can_start(&self) -> bool {
        true
    }
}

/// Implement [`Startable`] by delegating to inherent methods.
///
/// Adapters must implement:
/// - `async fn start_internal(&self) -> Result<()>`
/// - `async fn stop_internal(&self)`
/// - Optionally: custom `can_start` method (pass as third arg)
///
/// ```ignore
/// impl_startable!(BridgeAdapter, "mqtt", is_configured);
/// ```
#[macro_export]
macro_rules! impl_startable {
    ($adapter:ty, $name:literal, $can_start:ident) => {
        #[async_trait::async_trait]
        impl $crate::adapters::Startable for $adapter {
            fn name(&self) -> &'static str {
                $name
            }

            async fn start(&self) -> anyhow::Result<()> {
                self.start_internal().await
            }

            async fn stop(&self) {
                self.stop_internal().await
            }

            async fn can_start(&self) -> bool {
                self.$can_start().await
            }
        }
    };
}
