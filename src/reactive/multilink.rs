//! # 多源绑定与批处理调度
//!
//! `Multilink` 把一个回调绑定到多个 `Observable` 上；`Dispatcher`
//! 负责在批处理作用域内合并通知，作用域结束时每个脏回调只执行一次。
//!
//! ## 依赖关系
//! - 使用 `reactive/observable.rs`
//! - 被 `models/simulation.rs` 使用

use super::observable::{Observable, Subscription};

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

/// 一个待执行的绑定任务
struct LinkJob {
    dirty: Cell<bool>,
    runs: Cell<u64>,
    callback: Box<dyn Fn()>,
}

impl LinkJob {
    fn run(&self) {
        self.dirty.set(false);
        self.runs.set(self.runs.get() + 1);
        (self.callback)();
    }
}

#[derive(Default)]
struct DispatcherInner {
    depth: Cell<usize>,
    pending: RefCell<VecDeque<Weak<LinkJob>>>,
}

/// 变更通知调度器
///
/// 同一个模型的所有绑定共享一个调度器。
#[derive(Clone, Default)]
pub struct Dispatcher {
    inner: Rc<DispatcherInner>,
}

impl Dispatcher {
    /// 创建新的调度器
    pub fn new() -> Self {
        Self::default()
    }

    /// 在批处理作用域内执行 `f`
    ///
    /// 作用域可以嵌套，最外层结束时统一执行被标记的任务。
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = BatchGuard::enter(self);
        f()
    }

    /// 是否处于批处理作用域内
    pub fn is_batching(&self) -> bool {
        self.inner.depth.get() > 0
    }

    /// 等待执行的任务数量
    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    fn schedule(&self, job: &Rc<LinkJob>) {
        if job.dirty.replace(true) {
            return;
        }
        if self.is_batching() {
            self.inner.pending.borrow_mut().push_back(Rc::downgrade(job));
        } else {
            job.run();
        }
    }

    fn flush(&self) {
        loop {
            let next = self.inner.pending.borrow_mut().pop_front();
            match next {
                Some(weak) => {
                    if let Some(job) = weak.upgrade() {
                        job.run();
                    }
                }
                None => break,
            }
        }
    }
}

struct BatchGuard<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> BatchGuard<'a> {
    fn enter(dispatcher: &'a Dispatcher) -> Self {
        let depth = &dispatcher.inner.depth;
        depth.set(depth.get() + 1);
        Self { dispatcher }
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        let depth = &self.dispatcher.inner.depth;
        depth.set(depth.get() - 1);
        if depth.get() == 0 && !std::thread::panicking() {
            self.dispatcher.flush();
        }
    }
}

type Registrar = Box<dyn FnOnce(Weak<LinkJob>, Dispatcher) -> Subscription>;

/// Multilink 构建器
pub struct MultilinkBuilder {
    dispatcher: Dispatcher,
    registrars: Vec<Registrar>,
}

impl MultilinkBuilder {
    /// 添加一个依赖源
    pub fn source<T: Clone + PartialEq + 'static>(mut self, observable: &Observable<T>) -> Self {
        let observable = observable.clone();
        self.registrars.push(Box::new(move |job, dispatcher| {
            observable.subscribe(move |_| {
                if let Some(job) = job.upgrade() {
                    dispatcher.schedule(&job);
                }
            })
        }));
        self
    }

    /// 完成绑定，并立即执行一次回调
    pub fn build(self, callback: impl Fn() + 'static) -> Multilink {
        let MultilinkBuilder {
            dispatcher,
            registrars,
        } = self;

        let job = Rc::new(LinkJob {
            dirty: Cell::new(false),
            runs: Cell::new(0),
            callback: Box::new(callback),
        });

        let subscriptions = registrars
            .into_iter()
            .map(|register| register(Rc::downgrade(&job), dispatcher.clone()))
            .collect();

        job.run();

        Multilink {
            job,
            _subscriptions: subscriptions,
        }
    }
}

/// 多源绑定，drop 后自动解除
#[must_use = "dropping a Multilink detaches it from its sources"]
pub struct Multilink {
    job: Rc<LinkJob>,
    _subscriptions: Vec<Subscription>,
}

impl Multilink {
    /// 开始构建一个新的绑定
    pub fn builder(dispatcher: &Dispatcher) -> MultilinkBuilder {
        MultilinkBuilder {
            dispatcher: dispatcher.clone(),
            registrars: Vec::new(),
        }
    }

    /// 回调累计执行次数（包含创建时的首次执行）
    pub fn run_count(&self) -> u64 {
        self.job.runs.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter_link(
        dispatcher: &Dispatcher,
        a: &Observable<f64>,
        b: &Observable<f64>,
        c: &Observable<f64>,
    ) -> (Multilink, Rc<RefCell<Vec<f64>>>) {
        let sums = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&sums);
        let (ra, rb, rc) = (a.clone(), b.clone(), c.clone());
        let link = Multilink::builder(dispatcher)
            .source(a)
            .source(b)
            .source(c)
            .build(move || sink.borrow_mut().push(ra.get() + rb.get() + rc.get()));
        (link, sums)
    }

    #[test]
    fn test_runs_once_on_build() {
        let d = Dispatcher::new();
        let (a, b, c) = (Observable::new(1.0), Observable::new(2.0), Observable::new(3.0));
        let (link, sums) = counter_link(&d, &a, &b, &c);

        assert_eq!(link.run_count(), 1);
        assert_eq!(*sums.borrow(), vec![6.0]);
    }

    #[test]
    fn test_one_run_per_unbatched_change() {
        let d = Dispatcher::new();
        let (a, b, c) = (Observable::new(1.0), Observable::new(2.0), Observable::new(3.0));
        let (link, sums) = counter_link(&d, &a, &b, &c);

        a.set(10.0);
        c.set(30.0);
        assert_eq!(link.run_count(), 3);
        assert_eq!(*sums.borrow(), vec![6.0, 15.0, 42.0]);
    }

    #[test]
    fn test_batch_coalesces() {
        let d = Dispatcher::new();
        let (a, b, c) = (Observable::new(1.0), Observable::new(2.0), Observable::new(3.0));
        let (link, sums) = counter_link(&d, &a, &b, &c);

        d.batch(|| {
            a.set(10.0);
            b.set(20.0);
            c.set(30.0);
            assert!(d.is_batching());
            assert_eq!(d.pending(), 1);
        });

        assert_eq!(link.run_count(), 2);
        assert_eq!(*sums.borrow(), vec![6.0, 60.0]);
        assert!(!d.is_batching());
    }

    #[test]
    fn test_nested_batch_flushes_at_outermost() {
        let d = Dispatcher::new();
        let (a, b, c) = (Observable::new(1.0), Observable::new(2.0), Observable::new(3.0));
        let (link, _sums) = counter_link(&d, &a, &b, &c);

        d.batch(|| {
            a.set(4.0);
            d.batch(|| b.set(5.0));
            assert_eq!(link.run_count(), 1);
        });
        assert_eq!(link.run_count(), 2);
    }

    #[test]
    fn test_batch_without_effective_change() {
        let d = Dispatcher::new();
        let (a, b, c) = (Observable::new(1.0), Observable::new(2.0), Observable::new(3.0));
        let (link, _sums) = counter_link(&d, &a, &b, &c);

        d.batch(|| {
            a.set(1.0);
            b.set(2.0);
        });
        assert_eq!(link.run_count(), 1);
    }

    #[test]
    fn test_dropped_link_stops_running() {
        let d = Dispatcher::new();
        let (a, b, c) = (Observable::new(1.0), Observable::new(2.0), Observable::new(3.0));
        let (link, sums) = counter_link(&d, &a, &b, &c);

        drop(link);
        a.set(100.0);
        assert_eq!(sums.borrow().len(), 1);
        assert_eq!(a.subscriber_count(), 0);
    }
}
