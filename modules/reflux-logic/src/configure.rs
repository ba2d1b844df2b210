use std::sync::Arc;

use reflux_core::{enhance, Store, StoreExt};
use tracing::debug;

use crate::config::LogicConfig;
use crate::error::LogicError;
use crate::pipeline::{LogicEnhancer, LogicRegistry};

/// Register logic units on `store`.
///
/// If the store already has a logic pipeline anywhere in its enhancer chain,
/// the units are added to it and `store` is returned as is. Otherwise `store`
/// is wrapped in a new pipeline with the default [`LogicConfig`].
///
/// ```ignore
/// let store = configure_logic(store, |logic| {
///     logic.add(AddTodoHandler);
///     logic.add(UpdateTodoTextHandler);
/// })?;
/// ```
pub fn configure_logic<S, F>(store: Arc<dyn Store<S>>, configure: F) -> Result<Arc<dyn Store<S>>, LogicError>
where
    S: Send + Sync + 'static,
    F: FnOnce(&LogicRegistry<S>),
{
    configure_logic_with(store, LogicConfig::default(), configure)
}

/// [`configure_logic`] with explicit configuration. `config` only applies
/// when a new pipeline is created.
pub fn configure_logic_with<S, F>(
    store: Arc<dyn Store<S>>,
    config: LogicConfig,
    configure: F,
) -> Result<Arc<dyn Store<S>>, LogicError>
where
    S: Send + Sync + 'static,
    F: FnOnce(&LogicRegistry<S>),
{
    if let Some(existing) = store.find_enhancer::<LogicEnhancer<S>>() {
        debug!("Adding units to the existing logic pipeline");
        configure(existing.registry());
        return Ok(store);
    }

    let enhancer = LogicEnhancer::new(config)?;
    configure(enhancer.registry());
    Ok(enhance(store, enhancer))
}
