//! Main entry point for `UploadServer`

use upload_server::application::UPLOAD_SERVER_APP;

/// Boot `UploadServer`
fn main() {
    abscissa_core::boot(&UPLOAD_SERVER_APP);
}
