//! Explicit session state: the working image, live preview and export jobs.

pub(crate) mod export;
pub(crate) mod pacer;
pub(crate) mod render_session;
