use std::f64::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use tracing_test::traced_test;

use super::*;

trait Figure: Send + Sync {
    fn area(&self) -> f64;
}

struct Circle {
    radius: f64,
}

impl Circle {
    fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl Figure for Circle {
    fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }
}

#[derive(Default)]
struct Square {
    side: f64,
}

impl Figure for Square {
    fn area(&self) -> f64 {
        self.side * self.side
    }
}

injectable!(Circle => Circle::new);
injectable!(Square);
interface!(dyn Figure => Circle, Square);

#[derive(Default)]
struct Counter {
    hits: AtomicUsize,
}
injectable!(Counter);

struct Tag;

struct Title;
struct Pages;

struct Report {
    title: String,
    pages: u32,
}

impl Report {
    fn new(title: Named<String, Title>) -> Self {
        Self {
            title: title.into_inner(),
            pages: 1,
        }
    }

    fn with_pages(title: Named<String, Title>, pages: Named<u32, Pages>) -> Self {
        Self {
            title: title.into_inner(),
            pages: pages.into_inner(),
        }
    }
}

injectable!(Report => [Report::new, Report::with_pages]);

struct Chicken;
struct Egg;

impl Chicken {
    fn new(_egg: Box<Egg>) -> Self {
        Chicken
    }
}

impl Egg {
    fn new(_chicken: Box<Chicken>) -> Self {
        Egg
    }
}

injectable!(Chicken => Chicken::new);
injectable!(Egg => Egg::new);

struct Nest {
    eggs: usize,
}

impl Nest {
    fn empty() -> Self {
        Self { eggs: 0 }
    }

    fn with_egg(_egg: Box<Egg>) -> Self {
        Self { eggs: 1 }
    }
}

injectable!(Nest => [Nest::empty, Nest::with_egg]);

struct Ping;
struct Pong;

impl Ping {
    fn new(_pong: Arc<Pong>) -> Self {
        Ping
    }
}

impl Pong {
    fn new(_ping: Arc<Ping>) -> Self {
        Pong
    }
}

injectable!(Ping => Ping::new);
injectable!(Pong => Pong::new);

#[derive(Default)]
struct Payload([u64; 4]);
injectable!(Payload);

struct Envelope {
    payload: Box<Payload>,
}

impl Envelope {
    fn new(payload: Box<Payload>) -> Self {
        Self { payload }
    }
}

injectable!(Envelope => Envelope::new);

static TRACKED_BUILT: AtomicUsize = AtomicUsize::new(0);
static TRACKED_DROPPED: AtomicUsize = AtomicUsize::new(0);

struct Tracked;

impl Tracked {
    fn new() -> Self {
        TRACKED_BUILT.fetch_add(1, Ordering::SeqCst);
        Tracked
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        TRACKED_DROPPED.fetch_add(1, Ordering::SeqCst);
    }
}

injectable!(Tracked => Tracked::new);

struct Left;
struct Right;

struct Side {
    value: u32,
}

impl Side {
    fn new(value: Named<u32, Left>) -> Self {
        Self {
            value: value.into_inner(),
        }
    }
}

injectable!(Side => Side::new);

struct Pair {
    left: u32,
    right: u32,
}

impl Pair {
    fn new(left: Side, right: Named<u32, Right>) -> Self {
        Self {
            left: left.value,
            right: right.into_inner(),
        }
    }
}

injectable!(Pair => Pair::new);

// Disable clippy lint on the comparison of fat pointers:
// this is only test code, Arc::ptr_eq ignores the vtable part
#[allow(clippy::vtable_address_comparisons)]
#[test]
fn singleton_circle() -> Result<(), InjectError> {
    let injector = make_injector!(
        bind::<dyn Figure>().to_type::<Circle>().in_scope(Singleton),
        bind::<f64>().to(5.0_f64),
    );

    let a: Arc<dyn Figure> = injector.create()?;
    let b: Arc<dyn Figure> = injector.create()?;
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.area(), PI * 5.0 * 5.0);

    Ok(())
}

#[test]
fn unique_instances_are_independent() -> Result<(), InjectError> {
    let injector = make_injector!(bind::<Counter>().in_scope(Unique));

    let a: Arc<Counter> = injector.create()?;
    let b: Arc<Counter> = injector.create()?;
    assert!(!Arc::ptr_eq(&a, &b));
    a.hits.fetch_add(1, Ordering::SeqCst);
    assert_eq!(b.hits.load(Ordering::SeqCst), 0);

    let c: Box<Counter> = injector.create()?;
    let d: Box<Counter> = injector.create()?;
    assert!(!std::ptr::eq(&*c, &*d));

    // nothing would keep the instance alive
    assert!(matches!(
        injector.create::<Weak<Counter>>(),
        Err(InjectError::ShapeMismatch {
            requested: Shape::Weak,
            ..
        })
    ));

    Ok(())
}

#[test]
fn singleton_and_shared_reuse_their_instance() -> Result<(), InjectError> {
    let injector = make_injector!(
        bind::<Counter>().in_scope(Singleton),
        bind::<Counter>().named(Tag).in_scope(Shared),
    );

    let a: Arc<Counter> = injector.create()?;
    let b: Arc<Counter> = injector.create()?;
    assert!(Arc::ptr_eq(&a, &b));

    let c: Named<Arc<Counter>, Tag> = injector.create()?;
    let d: Named<Arc<Counter>, Tag> = injector.create()?;
    assert!(Arc::ptr_eq(&*c, &*d));
    assert!(!Arc::ptr_eq(&a, &*c));

    // a shared instance is never handed out as an owned one
    assert!(matches!(
        injector.create::<Box<Counter>>(),
        Err(InjectError::ShapeMismatch {
            requested: Shape::Boxed,
            ..
        })
    ));

    Ok(())
}

#[test]
fn deduced_scope_follows_the_shape() -> Result<(), InjectError> {
    // no binding at all: Counter binds to itself with the deduced scope
    let injector = make_injector!();

    let a: Arc<Counter> = injector.create()?;
    let b: Arc<Counter> = injector.create()?;
    assert!(Arc::ptr_eq(&a, &b));

    let weak: Weak<Counter> = injector.create()?;
    let upgraded = weak.upgrade().expect("the scope keeps the instance alive");
    assert!(Arc::ptr_eq(&a, &upgraded));

    let c: Box<Counter> = injector.create()?;
    let d: Box<Counter> = injector.create()?;
    assert!(!std::ptr::eq(&*c, &*d));
    assert!(!std::ptr::eq(&*c, &*a));

    let value: Counter = injector.create()?;
    assert_eq!(value.hits.load(Ordering::SeqCst), 0);

    assert!(matches!(
        injector.create::<&'static Counter>(),
        Err(InjectError::ShapeMismatch { .. })
    ));

    Ok(())
}

#[test]
fn references_keep_their_referent() -> Result<(), InjectError> {
    let injector = make_injector!(
        bind::<Counter>().in_scope(Singleton),
        bind::<Counter>().named(Tag).in_scope(Unique),
    );

    let shared: Arc<Counter> = injector.create()?;
    let r: Ref<Counter> = injector.create()?;
    assert!(Arc::ptr_eq(&shared, r.shared().expect("singleton storage")));

    // a fresh instance is moved to storage owned by the reference
    let fresh: Named<Ref<Counter>, Tag> = injector.create()?;
    let storage = fresh.shared().expect("auxiliary storage");
    assert_eq!(Arc::strong_count(storage), 1);
    assert_eq!(fresh.hits.load(Ordering::SeqCst), 0);

    Ok(())
}

#[test]
fn interfaces_need_a_binding() {
    let injector = make_injector!();

    assert!(matches!(
        injector.create::<Box<dyn Figure>>(),
        Err(InjectError::Unbound { .. })
    ));
    // Option only covers empty handles and refused allocations
    assert!(matches!(
        injector.create::<Option<Box<dyn Figure>>>(),
        Err(InjectError::Unbound { .. })
    ));
}

#[test]
fn named_bindings_are_disjoint() -> Result<(), InjectError> {
    struct Left;
    struct Right;

    let injector = make_injector!(
        bind::<u32>().named(Left).to(1_u32),
        bind::<u32>().named(Right).to(2_u32),
    );

    let left: Named<u32, Left> = injector.create()?;
    let right: Named<u32, Right> = injector.create()?;
    let plain: u32 = injector.create()?;
    assert_eq!(*left, 1);
    assert_eq!(*right, 2);
    assert_eq!(plain, 0);

    // named keys never fall back to the implicit binding
    assert!(matches!(
        injector.create::<Named<u32, Tag>>(),
        Err(InjectError::Unbound { .. })
    ));

    Ok(())
}

#[test]
fn greedy_constructor_selection() -> Result<(), InjectError> {
    let full = make_injector!(
        bind::<String>().named(Title).to(String::from("annual")),
        bind::<u32>().named(Pages).to(12_u32),
    );
    let report: Report = full.create()?;
    assert_eq!(report.title, "annual");
    assert_eq!(report.pages, 12);

    let partial = make_injector!(bind::<String>().named(Title).to(String::from("memo")));
    let report: Report = partial.create()?;
    assert_eq!(report.title, "memo");
    assert_eq!(report.pages, 1);

    let empty = make_injector!();
    assert!(matches!(
        empty.create::<Report>(),
        Err(InjectError::NotConstructible { .. })
    ));

    Ok(())
}

#[test]
fn constructor_limit() -> Result<(), InjectError> {
    let injector = Injector::builder()
        .bind(bind::<String>().named(Title).to(String::from("brief")))
        .bind(bind::<u32>().named(Pages).to(30_u32))
        .config(Config::default().with_ctor_limit(1))
        .build();
    let report: Report = injector.create()?;
    assert_eq!(report.pages, 1);

    let injector = Injector::builder()
        .config(Config::default().with_ctor_limit(0))
        .build();
    assert!(matches!(
        injector.create::<Box<Circle>>(),
        Err(InjectError::NotConstructible { limit: 0, .. })
    ));

    assert_eq!(
        Config::default().with_ctor_limit(64).ctor_limit(),
        MAX_CTOR_ARITY
    );

    Ok(())
}

#[test]
#[traced_test]
fn cycles_are_detected() {
    let injector = make_injector!();

    let Err(InjectError::CyclicResolution { path }) = injector.create::<Box<Chicken>>() else {
        panic!("expected a cyclic resolution");
    };
    assert!(path.contains("Chicken"));
    assert!(path.contains("Egg"));
    assert!(logs_contain("cyclic resolution"));

    // probing skips the candidate that would loop
    let nest: Nest = injector.create().expect("nest without eggs");
    assert_eq!(nest.eggs, 0);
}

#[test]
fn session_lifecycle() -> Result<(), InjectError> {
    struct Checkout;

    let injector = make_injector!(bind::<Counter>().in_scope(session(Checkout)));

    assert!(injector.create::<Option<Arc<Counter>>>()?.is_none());
    assert!(matches!(
        injector.create::<Arc<Counter>>(),
        Err(InjectError::Empty { .. })
    ));

    injector.call(&SessionEntry(Checkout));
    let a: Arc<Counter> = injector.create()?;
    let b: Arc<Counter> = injector.create()?;
    assert!(Arc::ptr_eq(&a, &b));

    // unrelated actions are ignored
    injector.call(&42_u8);
    let c: Arc<Counter> = injector.create()?;
    assert!(Arc::ptr_eq(&a, &c));

    injector.call(&SessionExit(Checkout));
    assert!(injector.create::<Option<Arc<Counter>>>()?.is_none());

    injector.call(&SessionEntry(Checkout));
    let d: Arc<Counter> = injector.create()?;
    assert!(!Arc::ptr_eq(&a, &d));

    Ok(())
}

#[test]
fn external_values() -> Result<(), InjectError> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let injector = make_injector!(
        bind::<u32>().to_fn(move || counter.fetch_add(1, Ordering::SeqCst) as u32 + 10),
        bind::<f64>().to(2.0_f64),
        bind::<dyn Figure>().to_with(|cx: &mut Context<'_>| {
            let side: f64 = cx.create()?;
            Ok(Square { side })
        }),
    );

    let a: u32 = injector.create()?;
    let b: u32 = injector.create()?;
    assert_eq!((a, b), (10, 11));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let figure: Box<dyn Figure> = injector.create()?;
    assert_eq!(figure.area(), 4.0);

    // values are copied for owned requests and shared otherwise
    let x: Arc<f64> = injector.create()?;
    let y: Arc<f64> = injector.create()?;
    assert!(Arc::ptr_eq(&x, &y));

    Ok(())
}

#[allow(clippy::vtable_address_comparisons)]
#[test]
fn shared_and_static_objects() -> Result<(), InjectError> {
    static GLOBAL: Counter = Counter {
        hits: AtomicUsize::new(0),
    };

    let square: Arc<dyn Figure> = Arc::new(Square { side: 3.0 });
    let injector = make_injector!(
        bind::<dyn Figure>().to_shared(square.clone()),
        bind::<Counter>().to_static(&GLOBAL),
    );

    let a: Arc<dyn Figure> = injector.create()?;
    assert!(Arc::ptr_eq(&a, &square));
    let weak: Weak<dyn Figure> = injector.create()?;
    assert!(weak.upgrade().is_some());

    let global: &'static Counter = injector.create()?;
    assert!(std::ptr::eq(global, &GLOBAL));
    let r: Ref<Counter> = injector.create()?;
    assert!(r.shared().is_none());
    assert!(std::ptr::eq(&*r, &GLOBAL));

    assert!(matches!(
        injector.create::<Box<Counter>>(),
        Err(InjectError::ShapeMismatch { .. })
    ));

    Ok(())
}

#[test]
#[traced_test]
fn refused_allocations() {
    let injector = make_injector!();
    let arena = Arena::with_capacity(std::mem::size_of::<Counter>());

    let first: Option<Box<Counter>> = injector.provide(&arena).expect("within budget");
    let second: Option<Box<Counter>> = injector.provide(&arena).expect("refusal as None");
    assert!(first.is_some());
    assert!(second.is_none());
    assert_eq!(arena.remaining(), 0);
    assert!(matches!(
        injector.provide::<Box<Counter>>(&arena),
        Err(InjectError::Allocation { .. })
    ));
    assert!(logs_contain("arena exhausted"));

    let constrained = Injector::builder()
        .config(Config::default().with_provider(Arena::with_capacity(0)))
        .build();
    assert!(constrained
        .create::<Option<Box<Counter>>>()
        .expect("refusal as None")
        .is_none());
}

#[allow(clippy::vtable_address_comparisons)]
#[test]
fn installed_injectors() -> Result<(), InjectError> {
    let parent = make_injector!(
        bind::<Counter>().in_scope(Singleton),
        bind::<Counter>().named(Tag).in_scope(Shared),
        bind::<dyn Figure>().to_type::<Circle>().in_scope(Unique),
        bind::<f64>().to(5.0_f64),
    );
    let child = Injector::builder()
        .install(&parent)
        .bind(bind::<f64>().to(1.0_f64))
        .build();

    // singletons are shared with the source, shared instances are not
    let a: Arc<Counter> = parent.create()?;
    let b: Arc<Counter> = child.create()?;
    assert!(Arc::ptr_eq(&a, &b));

    let c: Named<Arc<Counter>, Tag> = parent.create()?;
    let d: Named<Arc<Counter>, Tag> = child.create()?;
    let e: Named<Arc<Counter>, Tag> = child.create()?;
    assert!(!Arc::ptr_eq(&*c, &*d));
    assert!(Arc::ptr_eq(&*d, &*e));

    // installed bindings resolve their parameters in the source
    let figure: Box<dyn Figure> = child.create()?;
    assert_eq!(figure.area(), PI * 5.0 * 5.0);
    let radius: f64 = child.create()?;
    assert_eq!(radius, 1.0);

    Ok(())
}

#[allow(clippy::vtable_address_comparisons)]
#[test]
fn exposed_bindings() -> Result<(), InjectError> {
    let source = make_injector!(
        bind::<dyn Figure>().to_type::<Square>(),
        bind::<f64>().to(7.0_f64),
    );
    let injector = Injector::builder().expose::<dyn Figure>(&source).build();

    let a: Arc<dyn Figure> = injector.create()?;
    let b: Arc<dyn Figure> = injector.create()?;
    assert!(Arc::ptr_eq(&a, &b));

    let c: Box<dyn Figure> = injector.create()?;
    assert_eq!(c.area(), 0.0);

    // only the exposed type is visible
    let plain: f64 = injector.create()?;
    assert_eq!(plain, 0.0);

    Ok(())
}

#[test]
fn modules_and_arguments() -> Result<(), InjectError> {
    struct FigureModule;

    impl Module for FigureModule {
        fn configure(&self, builder: InjectorBuilder) -> InjectorBuilder {
            builder.bind(bind::<dyn Figure>().to_type::<Circle>())
        }
    }

    let injector = Injector::builder()
        .module(&FigureModule)
        .arg(2.0_f64)
        .build();

    let figure: Box<dyn Figure> = injector.create()?;
    assert_eq!(figure.area(), PI * 2.0 * 2.0);

    // request arguments come before the injector's own bindings
    let figure: Box<dyn Figure> = injector.create_with(&Args::new().value(3.0_f64))?;
    assert_eq!(figure.area(), PI * 3.0 * 3.0);

    let figure: Box<dyn Figure> = injector.create()?;
    assert_eq!(figure.area(), PI * 2.0 * 2.0);

    Ok(())
}

#[test]
#[traced_test]
fn later_bindings_shadow_earlier_ones() {
    let injector = make_injector!(bind::<u32>().to(1_u32), bind::<u32>().to(2_u32));

    let value: u32 = injector.create().expect("last binding");
    assert_eq!(value, 2);
    assert_eq!(injector.bindings().len(), 1);
    assert!(logs_contain("binding shadows an earlier declaration"));
}

#[test]
fn concurrent_first_use() {
    let injector = make_injector!(bind::<Counter>().in_scope(Singleton));

    let instances: Vec<Arc<Counter>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| injector.create::<Arc<Counter>>()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread").expect("singleton"))
            .collect()
    });

    assert!(instances.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[test]
#[traced_test]
fn cycles_through_request_arguments() {
    let parent = make_injector!(bind::<Pong>());
    let child = Injector::builder().install(&parent).build();

    // the argument binding is reached again from the installed binding
    let args = Args::new().with(bind::<Ping>().in_scope(Singleton));
    let Err(InjectError::CyclicResolution { path }) = child.create_with::<Arc<Ping>>(&args) else {
        panic!("expected a cyclic resolution");
    };
    assert!(path.contains("Ping"));
    assert!(path.contains("Pong"));
    assert!(logs_contain("cyclic resolution"));
}

#[test]
fn nested_refusals_charge_nothing() -> Result<(), InjectError> {
    let injector = make_injector!();
    let payload = std::mem::size_of::<Payload>();
    let envelope = std::mem::size_of::<Envelope>();

    // room for the envelope, not for its payload
    let arena = Arena::with_capacity(envelope);
    let refused: Option<Box<Envelope>> = injector.provide(&arena)?;
    assert!(refused.is_none());
    assert_eq!(arena.used(), 0);
    assert_eq!(arena.remaining(), envelope);

    let arena = Arena::with_capacity(payload + envelope);
    let built: Option<Box<Envelope>> = injector.provide(&arena)?;
    let built = built.expect("both instances fit");
    assert_eq!(built.payload.0, [0; 4]);
    assert_eq!(arena.remaining(), 0);

    Ok(())
}

#[test]
fn every_instance_is_released_once() -> Result<(), InjectError> {
    let injector = make_injector!(bind::<Tracked>().named(Tag).in_scope(Unique));
    {
        let value: Tracked = injector.create()?;
        let boxed: Box<Tracked> = injector.create()?;
        let shared: Arc<Tracked> = injector.create()?;
        let referent: Ref<Tracked> = injector.create()?;
        let weak: Weak<Tracked> = injector.create()?;

        // owned instances converted to shared ones
        let promoted: Named<Arc<Tracked>, Tag> = injector.create()?;
        let pinned: Named<Ref<Tracked>, Tag> = injector.create()?;
        let moved: Named<Tracked, Tag> = injector.create()?;

        drop((value, boxed, promoted, pinned, moved));
        assert!(weak.upgrade().is_some());
        drop((shared, referent));
    }
    // two unique, one deduced singleton and three named unique instances
    let built = TRACKED_BUILT.load(Ordering::SeqCst);
    assert_eq!(built, 6);
    // the deduced singleton is still held by the injector
    assert_eq!(TRACKED_DROPPED.load(Ordering::SeqCst), built - 1);

    drop(injector);
    assert_eq!(TRACKED_DROPPED.load(Ordering::SeqCst), built);

    Ok(())
}

#[test]
fn arguments_are_resolved_left_to_right() -> Result<(), InjectError> {
    let log = Arc::new(std::sync::Mutex::new(Vec::new()));
    let left = log.clone();
    let right = log.clone();

    let injector = make_injector!(
        bind::<u32>().named(Left).to_fn(move || {
            left.lock().expect("log").push("left");
            1_u32
        }),
        bind::<u32>().named(Right).to_fn(move || {
            right.lock().expect("log").push("right");
            2_u32
        }),
    );

    let pair: Pair = injector.create()?;
    assert_eq!((pair.left, pair.right), (1, 2));
    // the first parameter, with its own dependencies, is complete before the second starts
    assert_eq!(*log.lock().expect("log"), ["left", "right"]);

    let _again: Pair = injector.create()?;
    assert_eq!(*log.lock().expect("log"), ["left", "right", "left", "right"]);

    Ok(())
}
