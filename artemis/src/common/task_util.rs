/// Spawn an async task on a new thread.
///
/// Stores use it to run submitted operations off the caller's thread; callbacks
/// are invoked on the spawned thread.
pub fn async_task<OP>(op: OP)
where
    OP: FnOnce() + Send + 'static,
{
    std::thread::spawn(op);
}
