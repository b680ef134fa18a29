use std::io;

use once_cell::sync::OnceCell;
use tokio::runtime::{Builder, Runtime};

static PROBE_RUNTIME: OnceCell<Runtime> = OnceCell::new();

pub(crate) fn runtime() -> io::Result<&'static Runtime> {
    PROBE_RUNTIME.get_or_try_init(|| {
        Builder::new_multi_thread()
            .enable_all()
            .thread_name("cec-probe-runtime")
            .build()
    })
}
