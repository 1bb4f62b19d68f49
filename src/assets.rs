pub(crate) mod crop;
pub(crate) mod decode;
pub(crate) mod working;
