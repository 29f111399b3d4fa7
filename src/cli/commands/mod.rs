pub(crate) mod bases;
pub(crate) mod import;
pub(crate) mod init;
pub(crate) mod plugin;
pub(crate) mod view;
