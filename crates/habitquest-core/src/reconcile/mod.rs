mod cache;
mod reconciler;

pub use cache::EntityCache;
pub use reconciler::ActionReconciler;
