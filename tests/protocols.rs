use std::cell::RefCell;
use std::rc::Rc;

use omnival::{
    Atom, Closeable, Complex64, CompositeValue, Field, FieldInit, Invocable, Kind,
};

#[test]
fn default_composite_is_falsy_until_any_field_flips() {
    let composite = CompositeValue::new();
    assert!(!composite.truthy().unwrap());

    for field in Field::ALL {
        let mut composite = CompositeValue::new();
        let truthy_value = match field.kind() {
            Kind::Bool => Atom::Bool(true),
            Kind::Int => Atom::Int(3),
            Kind::Float => Atom::Float(0.5),
            Kind::Complex => Atom::Complex(Complex64::new(0.0, 1.0)),
            Kind::Str => Atom::from("x"),
            Kind::Dict => Atom::list(vec![Atom::tuple(vec![Atom::Int(1), Atom::Int(2)])]),
            _ => Atom::list(vec![Atom::Int(1)]),
        };
        composite.slot_mut(field).set(truthy_value).unwrap();
        assert!(composite.truthy().unwrap(), "field {field}");
    }
}

#[test]
fn iteration_walks_fields_in_storage_order() {
    let composite = CompositeValue::with_fields(FieldInit {
        integer: Some(Atom::Int(4)),
        string: Some(Atom::from("sing")),
        ..FieldInit::default()
    })
    .unwrap();
    let collected: Vec<Atom> = composite.iter().unwrap().collect();
    assert_eq!(collected.len(), 10);
    assert_eq!(collected[1], Atom::Int(4));
    assert_eq!(collected[4], Atom::from("sing"));

    let reversed = composite.reversed().unwrap();
    assert_eq!(reversed[8], Atom::Int(4));
    assert_eq!(reversed[5], Atom::from("sing"));
}

#[test]
fn containment_checks_field_values() {
    let composite = CompositeValue::with_fields(FieldInit {
        integer: Some(Atom::Int(4)),
        ..FieldInit::default()
    })
    .unwrap();
    assert!(composite.contains(&Atom::Int(4)).unwrap());
    // Numeric equivalence applies: 4.0 matches the integer field.
    assert!(composite.contains(&Atom::Float(4.0)).unwrap());
    assert!(!composite.contains(&Atom::Int(9)).unwrap());
}

#[test]
fn deleting_a_slot_poisons_bulk_operations() {
    let mut composite = CompositeValue::new();
    composite.slot_mut(Field::Integer).delete().unwrap();
    assert!(composite.all_types().is_err());
    assert!(composite.truthy().is_err());
    composite.slot_mut(Field::Integer).set(Atom::Int(0)).unwrap();
    assert!(composite.all_types().is_ok());
}

#[test]
fn unary_operators_cover_the_numeric_fields() {
    let composite = CompositeValue::with_fields(FieldInit {
        boolean: Some(Atom::Bool(true)),
        integer: Some(Atom::Int(-4)),
        float_num: Some(Atom::Float(-2.5)),
        complex_num: Some(Atom::Complex(Complex64::new(3.0, -4.0))),
        ..FieldInit::default()
    })
    .unwrap();
    assert_eq!(
        composite.plus().unwrap(),
        [
            Atom::Int(1),
            Atom::Int(-4),
            Atom::Float(-2.5),
            Atom::Complex(Complex64::new(3.0, -4.0)),
        ]
    );
    assert_eq!(
        composite.minus().unwrap(),
        [
            Atom::Int(-1),
            Atom::Int(4),
            Atom::Float(2.5),
            Atom::Complex(Complex64::new(-3.0, 4.0)),
        ]
    );
    assert_eq!(
        composite.abs_values().unwrap(),
        [Atom::Int(4), Atom::Float(2.5), Atom::Float(5.0)]
    );
}

#[test]
fn rounding_is_half_to_even() {
    let composite = CompositeValue::with_fields(FieldInit {
        float_num: Some(Atom::Float(2.5)),
        ..FieldInit::default()
    })
    .unwrap();
    assert_eq!(composite.round_float(None).unwrap(), Atom::Int(2));
    assert_eq!(composite.round_float(Some(1)).unwrap(), Atom::Float(2.5));
    assert_eq!(composite.floor_value().unwrap(), 2);
    assert_eq!(composite.ceil_value().unwrap(), 3);
    assert_eq!(composite.trunc_value().unwrap(), 2);
}

#[test]
fn base_conversions_format_the_integer_field() {
    let composite = CompositeValue::with_fields(FieldInit {
        integer: Some(Atom::Int(-8)),
        ..FieldInit::default()
    })
    .unwrap();
    assert_eq!(composite.to_oct().unwrap(), "-0o10");
    assert_eq!(composite.to_hex().unwrap(), "-0x8");
    assert_eq!(composite.as_index().unwrap(), -8);
}

#[test]
fn format_substitutes_the_string_field() {
    let composite = CompositeValue::with_fields(FieldInit {
        string: Some(Atom::from("sing")),
        ..FieldInit::default()
    })
    .unwrap();
    assert_eq!(composite.format_spec().unwrap(), "sing");
}

struct FileProbe {
    name: &'static str,
    closed: Rc<RefCell<u32>>,
}

impl Closeable for FileProbe {
    fn name(&self) -> &str {
        self.name
    }

    fn close(&mut self) {
        *self.closed.borrow_mut() += 1;
    }
}

struct Greeter;

impl Invocable for Greeter {
    fn name(&self) -> &str {
        "greeter"
    }

    fn invoke(&mut self, args: &[Atom]) -> Atom {
        Atom::Str(format!("hello {}", args.first().map(Atom::text).unwrap_or_default()))
    }
}

#[test]
fn scope_exit_closes_every_closeable_exactly_once() {
    let mut composite = CompositeValue::new();
    let first = Rc::new(RefCell::new(0u32));
    let second = Rc::new(RefCell::new(0u32));
    composite.attach_closeable(Rc::new(RefCell::new(FileProbe {
        name: "log",
        closed: first.clone(),
    })));
    composite.attach_closeable(Rc::new(RefCell::new(FileProbe {
        name: "spool",
        closed: second.clone(),
    })));
    // Invocables do not participate in the resource scope.
    composite.attach_invocable(Rc::new(RefCell::new(Greeter)));

    {
        let scope = composite.scope();
        assert_eq!(scope.names(), vec!["log".to_owned(), "spool".to_owned()]);
        assert_eq!((*first.borrow(), *second.borrow()), (0, 0));
    }
    assert_eq!((*first.borrow(), *second.borrow()), (1, 1));

    // A second scope closes again: exit is unconditional, not idempotent.
    drop(composite.scope());
    assert_eq!(*first.borrow(), 2);
}

#[test]
fn call_protocol_returns_results_keyed_by_name() {
    let mut composite = CompositeValue::new();
    composite.attach_invocable(Rc::new(RefCell::new(Greeter)));
    let results = composite.invoke_all(&[Atom::from("world")]);
    assert_eq!(results.len(), 1);
    assert_eq!(results.get("greeter"), Some(&Atom::from("hello world")));
}

#[test]
fn dispatch_emits_trace_events_without_panicking() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::TRACE)
        .with_test_writer()
        .try_init();
    let composite = CompositeValue::new();
    composite
        .combine(&Atom::Int(1), omnival::Operator::Add, omnival::Side::Left, None)
        .unwrap();
    composite.compare(&Atom::Int(1), omnival::CmpOperator::Eq).unwrap();
}

#[test]
fn clone_copies_fields_but_shares_attachments() {
    let mut composite = CompositeValue::with_fields(FieldInit {
        integer: Some(Atom::Int(4)),
        ..FieldInit::default()
    })
    .unwrap();
    let counter = Rc::new(RefCell::new(0u32));
    composite.attach_closeable(Rc::new(RefCell::new(FileProbe {
        name: "log",
        closed: counter.clone(),
    })));

    let mut copied = composite.clone();
    copied.slot_mut(Field::Integer).set(Atom::Int(9)).unwrap();
    // Field storage is independent between the copies.
    assert_eq!(composite.slot(Field::Integer).get().unwrap(), Atom::Int(4));
    // The attachment is shared: closing through the copy is visible here.
    drop(copied.scope());
    assert_eq!(*counter.borrow(), 1);
}
