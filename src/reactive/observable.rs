//! # Observable 值容器
//!
//! 单线程共享的可观察值。订阅者以 `Weak` 形式保存，
//! 在通知时惰性清理已失效的回调。
//!
//! ## 依赖关系
//! - 被 `reactive/multilink.rs` 和 `models/` 使用

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Box<dyn Fn(&T)>;

struct Inner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Weak<Callback<T>>>,
}

/// 可观察值
///
/// `clone()` 得到的是同一个值的另一个句柄，而不是值的拷贝。
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// 创建新的 Observable
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// 当前值的拷贝
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// 以引用方式访问当前值
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// 版本号，每次有效变更加一
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// 设置新值，返回值是否发生了变化
    pub fn set(&self, value: T) -> bool {
        let callbacks = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return false;
            }
            inner.value = value;
            inner.version += 1;
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(Weak::upgrade)
                .collect::<Vec<_>>()
        };

        // 通知时不能持有借用，回调可能会读取本值
        let snapshot = self.get();
        for callback in callbacks {
            callback(&snapshot);
        }
        true
    }

    /// 注册变更回调
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Rc<Callback<T>> = Rc::new(Box::new(callback));
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&callback));
        Subscription { _callback: callback }
    }

    /// 仍然存活的订阅者数量
    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

/// 订阅守卫，drop 后回调不再被调用
#[must_use = "dropping a Subscription immediately unsubscribes the callback"]
pub struct Subscription {
    _callback: Rc<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_set_notifies_and_bumps_version() {
        let obs = Observable::new(1.0_f64);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = obs.subscribe(move |v| sink.borrow_mut().push(*v));

        assert!(obs.set(2.0));
        assert!(obs.set(3.5));
        assert_eq!(*seen.borrow(), vec![2.0, 3.5]);
        assert_eq!(obs.version(), 2);
        assert_eq!(obs.get(), 3.5);
    }

    #[test]
    fn test_equal_value_is_noop() {
        let obs = Observable::new(5_i32);
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let _sub = obs.subscribe(move |_| c.set(c.get() + 1));

        assert!(!obs.set(5));
        assert_eq!(count.get(), 0);
        assert_eq!(obs.version(), 0);
    }

    #[test]
    fn test_registration_order() {
        let obs = Observable::new(0_u8);
        let order = Rc::new(RefCell::new(Vec::new()));
        let o1 = Rc::clone(&order);
        let o2 = Rc::clone(&order);
        let _s1 = obs.subscribe(move |_| o1.borrow_mut().push("first"));
        let _s2 = obs.subscribe(move |_| o2.borrow_mut().push("second"));

        obs.set(1);
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_drop_subscription_unsubscribes() {
        let obs = Observable::new(0_u8);
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let sub = obs.subscribe(move |_| c.set(c.get() + 1));

        obs.set(1);
        drop(sub);
        obs.set(2);

        assert_eq!(count.get(), 1);
        assert_eq!(obs.subscriber_count(), 0);
    }

    #[test]
    fn test_callback_can_read_value() {
        let obs = Observable::new(10_i32);
        let reader = obs.clone();
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let _sub = obs.subscribe(move |_| s.set(reader.get()));

        obs.set(obs.with(|v| v * 2));
        assert_eq!(seen.get(), 20);
    }
}
