#![no_main]

use libfuzzer_sys::fuzz_target;
use sigtrust_lib::{TrustContext, VerifyOptions};
use std::path::Path;
use std::sync::OnceLock;

fn context() -> Option<&'static TrustContext> {
    static CONTEXT: OnceLock<Option<TrustContext>> = OnceLock::new();
    CONTEXT
        .get_or_init(|| {
            let certs = Path::new(env!("CARGO_MANIFEST_DIR"))
                .join("../sigtrust-lib/tests/certs");
            TrustContext::init(certs.join("root-ca.pem"), Some(certs.join("crl.pem").as_path())).ok()
        })
        .as_ref()
}

fuzz_target!(|data: &[u8]| {
    let Some(ctx) = context() else {
        return;
    };
    // First byte picks the split point and the expiration override.
    let Some((&head, rest)) = data.split_first() else {
        return;
    };
    let split = usize::from(head).min(rest.len());
    let (content, signature) = rest.split_at(split);
    let options = VerifyOptions::default().with_ignore_expiration(head & 1 == 1);
    let _ = ctx.verify_data(content, signature, options);
});
