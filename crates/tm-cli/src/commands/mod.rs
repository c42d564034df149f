//! CLI command implementations

pub(crate) mod applied;
pub(crate) mod init;
pub(crate) mod rollout;
pub(crate) mod status;
