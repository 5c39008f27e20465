/// Wall-clock abstraction so cache TTL logic never reads ambient time.
///
/// The browser build uses `js_sys::Date::now`; tests inject a settable
/// clock to step through TTL windows deterministically.
pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

impl<T: Clock + ?Sized> Clock for std::rc::Rc<T> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
