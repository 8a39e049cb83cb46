// web server response handler modules
pub(crate) mod files;
pub(crate) mod health;
pub(crate) mod not_found;
pub(crate) mod upload;

// Support modules
pub(crate) mod file_helpers;
