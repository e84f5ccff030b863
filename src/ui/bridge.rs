use std::future::Future;

use foodrelief::scope::ViewScope;

/// Runs `fut` on the shared runtime inside `scope` and hands its output to
/// `on_done` on the GTK main loop. Nothing is delivered if the scope closes
/// first.
pub fn run_in_scope<T, Fut, F>(scope: &ViewScope, fut: Fut, on_done: F)
where
    T: Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    F: FnOnce(T) + 'static,
{
    let (tx, rx) = tokio::sync::oneshot::channel();
    let spawned = scope.spawn(async move {
        let _ = tx.send(fut.await);
    });
    if !spawned {
        return;
    }
    glib::MainContext::default().spawn_local(async move {
        if let Ok(value) = rx.await {
            on_done(value);
        }
    });
}
