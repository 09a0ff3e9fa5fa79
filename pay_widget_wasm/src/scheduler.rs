// Runs controller tasks on the browser event loop

use futures_util::future::LocalBoxFuture;
use pay_widget_core::ports::Scheduler;
use pay_widget_core::wasm::sleep_ms;

#[derive(Default)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn delay(&self, ms: u64) -> LocalBoxFuture<'static, ()> {
        Box::pin(sleep_ms(ms))
    }
}
