/// Convenience type to make error mapping cleaner
pub type Result<T = ()> = anyhow::Result<T>;

