use omnival::{
    Atom, AtomMap, Combined, Complex64, CompositeValue, ExcType, Field, FieldInit, Operator, Side,
};

/// A composite with one distinctive value per field, used across the
/// arithmetic tests.
fn sample() -> CompositeValue {
    let mut dictionary = AtomMap::default();
    dictionary.insert(Atom::Int(5), Atom::from("5"));
    CompositeValue::with_fields(FieldInit {
        boolean: Some(Atom::Bool(false)),
        integer: Some(Atom::Int(4)),
        float_num: Some(Atom::Float(-2.5)),
        complex_num: Some(Atom::Complex(Complex64::new(3.0, -2.0))),
        string: Some(Atom::from("sing")),
        array: Some(Atom::list(vec![Atom::Int(1), Atom::Int(4)])),
        tuple: Some(Atom::tuple(vec![Atom::Int(6), Atom::Int(1)])),
        dictionary: Some(Atom::Dict(dictionary)),
        set: Some(Atom::set([Atom::Int(1), Atom::Int(6)])),
        frozenset: Some(Atom::frozen_set([Atom::Int(12), Atom::Int(5)])),
        ..FieldInit::default()
    })
    .expect("sample fields all coerce")
}

fn values(result: Vec<Combined>) -> Vec<Atom> {
    result
        .into_iter()
        .map(|c| match c {
            Combined::Value(atom) => atom,
            Combined::Marker(text) => panic!("unexpected marker position: {text}"),
        })
        .collect()
}

#[test]
fn numeric_operand_adds_over_the_four_numeric_fields() {
    let composite = CompositeValue::with_fields(FieldInit {
        integer: Some(Atom::Int(4)),
        ..FieldInit::default()
    })
    .unwrap();
    let result = values(composite.combine(&Atom::Int(4), Operator::Add, Side::Left, None).unwrap());
    assert_eq!(
        result,
        vec![
            Atom::Int(4),
            Atom::Int(8),
            Atom::Float(4.0),
            Atom::Complex(Complex64::new(4.0, 0.0)),
        ]
    );
}

#[test]
fn boolean_operand_adds_over_all_ten_fields() {
    let result = values(sample().combine(&Atom::Bool(true), Operator::Add, Side::Left, None).unwrap());
    // Every field coerces to boolean first; True + True is 2.
    assert_eq!(result[0], Atom::Int(1));
    assert_eq!(result.len(), 10);
    assert_eq!(&result[1..], &vec![Atom::Int(2); 9][..]);
}

#[test]
fn text_operand_concatenates_field_display_forms() {
    let result = values(sample().combine(&Atom::from(" + str"), Operator::Add, Side::Left, None).unwrap());
    assert_eq!(result[0], Atom::from("False + str"));
    assert_eq!(result[2], Atom::from("-2.5 + str"));
    assert_eq!(result[3], Atom::from("(3-2j) + str"));
    assert_eq!(result[5], Atom::from("[1, 4] + str"));
    assert_eq!(result[7], Atom::from("{5: '5'} + str"));
    assert_eq!(result[9], Atom::from("frozenset({12, 5}) + str"));
}

#[test]
fn text_operand_on_the_right_prepends() {
    let result = values(sample().combine(&Atom::from("!"), Operator::Add, Side::Right, None).unwrap());
    assert_eq!(result[0], Atom::from("!False"));
    assert_eq!(result[4], Atom::from("!sing"));
}

#[test]
fn list_operand_concatenates_with_wrapped_scalars() {
    let other = Atom::list(vec![Atom::Int(1), Atom::Int(2)]);
    let result = values(sample().combine(&other, Operator::Add, Side::Left, None).unwrap());
    assert_eq!(result[0], Atom::list(vec![Atom::Bool(false), Atom::Int(1), Atom::Int(2)]));
    assert_eq!(result[1], Atom::list(vec![Atom::Int(4), Atom::Int(1), Atom::Int(2)]));
    // The mapping field contributes its keys.
    assert_eq!(result[7], Atom::list(vec![Atom::Int(5), Atom::Int(1), Atom::Int(2)]));
    let result = values(sample().combine(&other, Operator::Add, Side::Right, None).unwrap());
    assert_eq!(result[1], Atom::list(vec![Atom::Int(1), Atom::Int(2), Atom::Int(4)]));
}

#[test]
fn subtraction_of_a_number_touches_the_numeric_fields() {
    let result = values(sample().combine(&Atom::Float(1.4), Operator::Sub, Side::Left, None).unwrap());
    assert_eq!(
        result,
        vec![
            Atom::Float(-1.4),
            Atom::Float(4.0 - 1.4),
            Atom::Float(-2.5 - 1.4),
            Atom::Complex(Complex64::new(3.0 - 1.4, -2.0)),
        ]
    );
    let result = values(sample().combine(&Atom::Int(2), Operator::Sub, Side::Right, None).unwrap());
    assert_eq!(result[0], Atom::Int(2));
    assert_eq!(result[1], Atom::Int(-2));
}

#[test]
fn subtraction_of_a_set_unions_despite_the_symbol() {
    let composite = CompositeValue::with_fields(FieldInit {
        string: Some(Atom::from("ab")),
        ..FieldInit::default()
    })
    .unwrap();
    let operand = Atom::set([Atom::Int(9)]);
    let result = values(composite.combine(&operand, Operator::Sub, Side::Left, None).unwrap());
    assert_eq!(result.len(), 10);
    // The text field flattens to its characters, then unions with the operand
    // rather than differencing against it.
    assert_eq!(
        result[4],
        Atom::set([Atom::from("a"), Atom::from("b"), Atom::Int(9)])
    );
    // Scalar fields wrap as one-element sets first.
    assert_eq!(result[1], Atom::set([Atom::Int(0), Atom::Int(9)]));
}

#[test]
fn multiplication_by_an_integer_repeats_text_and_sequences() {
    let result = values(sample().combine(&Atom::Int(2), Operator::Mult, Side::Left, None).unwrap());
    assert_eq!(
        result,
        vec![
            Atom::Int(0),
            Atom::Int(8),
            Atom::Float(-5.0),
            Atom::Complex(Complex64::new(6.0, -4.0)),
            Atom::from("singsing"),
            Atom::list(vec![Atom::Int(1), Atom::Int(4), Atom::Int(1), Atom::Int(4)]),
            Atom::tuple(vec![Atom::Int(6), Atom::Int(1), Atom::Int(6), Atom::Int(1)]),
        ]
    );
}

#[test]
fn multiplication_by_a_float_stays_numeric() {
    let result = values(sample().combine(&Atom::Float(2.5), Operator::Mult, Side::Left, None).unwrap());
    assert_eq!(result.len(), 4);
    assert_eq!(result[1], Atom::Float(10.0));
}

#[test]
fn right_multiplication_by_text_repeats_by_the_first_two_fields() {
    let result = values(sample().combine(&Atom::from("str"), Operator::Mult, Side::Right, None).unwrap());
    assert_eq!(result, vec![Atom::from(""), Atom::from("strstrstrstr")]);
}

#[test]
fn division_spans_the_four_numeric_fields() {
    let composite = CompositeValue::with_fields(FieldInit {
        boolean: Some(Atom::Bool(true)),
        integer: Some(Atom::Int(4)),
        float_num: Some(Atom::Float(-2.5)),
        complex_num: Some(Atom::Complex(Complex64::new(3.0, -2.0))),
        ..FieldInit::default()
    })
    .unwrap();
    let result = values(composite.combine(&Atom::Int(10), Operator::Div, Side::Right, None).unwrap());
    assert_eq!(result[0], Atom::Float(10.0));
    assert_eq!(result[1], Atom::Float(2.5));
    assert_eq!(result[2], Atom::Float(-4.0));
}

#[test]
fn division_by_a_zero_field_fails() {
    let err = sample()
        .combine(&Atom::Int(10), Operator::Div, Side::Right, None)
        .unwrap_err();
    // The boolean field is False: 10 / False divides by zero.
    assert_eq!(err.exc_type(), ExcType::ZeroDivisionError);
}

#[test]
fn floor_division_and_modulo_use_the_first_three_fields() {
    let result = values(sample().combine(&Atom::Int(2), Operator::FloorDiv, Side::Left, None).unwrap());
    assert_eq!(result, vec![Atom::Int(0), Atom::Int(2), Atom::Float(-2.0)]);
    let result = values(sample().combine(&Atom::Int(3), Operator::Mod, Side::Left, None).unwrap());
    // Floor-style modulo keeps the divisor's sign: -2.5 % 3 is 0.5.
    assert_eq!(result, vec![Atom::Int(0), Atom::Int(1), Atom::Float(0.5)]);
}

#[test]
fn divmod_pairs_quotient_and_remainder() {
    let result = values(sample().combine(&Atom::Int(-2), Operator::Divmod, Side::Left, None).unwrap());
    assert_eq!(result[0], Atom::tuple(vec![Atom::Int(0), Atom::Int(0)]));
    assert_eq!(result[1], Atom::tuple(vec![Atom::Int(-2), Atom::Int(0)]));
    assert_eq!(result[2], Atom::tuple(vec![Atom::Float(1.0), Atom::Float(-0.5)]));
}

#[test]
fn power_without_modulus_covers_the_complex_field() {
    let result = values(sample().combine(&Atom::Int(2), Operator::Pow, Side::Left, None).unwrap());
    assert_eq!(result.len(), 4);
    assert_eq!(result[1], Atom::Int(16));
    assert_eq!(result[2], Atom::Float(6.25));
    let Atom::Complex(c) = &result[3] else {
        panic!("complex field should stay complex under power");
    };
    assert!((c.re - 5.0).abs() < 1e-9 && (c.im + 12.0).abs() < 1e-9);
}

#[test]
fn power_with_modulus_excludes_the_complex_field() {
    let result = values(
        sample()
            .combine(&Atom::Int(2), Operator::Pow, Side::Left, Some(&Atom::Int(3)))
            .unwrap(),
    );
    // int(False) ** 2 % 3, 4 ** 2 % 3, int(-2.5) ** 2 % 3
    assert_eq!(result, vec![Atom::Int(0), Atom::Int(1), Atom::Int(1)]);
}

#[test]
fn power_with_a_non_integer_modulus_is_rejected() {
    let err = sample()
        .combine(&Atom::Int(2), Operator::Pow, Side::Left, Some(&Atom::Float(1.5)))
        .unwrap_err();
    assert_eq!(err.exc_type(), ExcType::TypeError);
}

#[test]
fn right_power_raises_the_operand_to_each_field() {
    let result = values(sample().combine(&Atom::Int(2), Operator::Pow, Side::Right, None).unwrap());
    assert_eq!(result[0], Atom::Int(1));
    assert_eq!(result[1], Atom::Int(16));
    assert_eq!(result[2], Atom::Float(2f64.powf(-2.5)));
}

#[test]
fn left_shift_coerces_the_first_three_fields_to_integer() {
    let result = values(sample().combine(&Atom::Int(5), Operator::RShift, Side::Left, None).unwrap());
    // int(-2.5) >> 5 keeps the sign.
    assert_eq!(result, vec![Atom::Int(0), Atom::Int(0), Atom::Int(-1)]);
}

#[test]
fn right_shift_substitutes_a_marker_for_negative_fields() {
    let result = sample().combine(&Atom::Int(3), Operator::RShift, Side::Right, None).unwrap();
    assert_eq!(result[0], Combined::Value(Atom::Int(3)));
    assert_eq!(result[1], Combined::Value(Atom::Int(0)));
    assert_eq!(result[2], Combined::Marker("-2.5 < 0".to_owned()));
    assert_eq!(result[2].to_string(), "-2.5 < 0");
}

#[test]
fn negative_shift_count_on_the_left_side_fails() {
    let err = sample()
        .combine(&Atom::Int(-1), Operator::LShift, Side::Left, None)
        .unwrap_err();
    assert_eq!(err.exc_type(), ExcType::ValueError);
}

#[test]
fn integer_bitwise_ops_cover_the_first_three_fields() {
    let result = values(sample().combine(&Atom::Int(2), Operator::BitXor, Side::Right, None).unwrap());
    // 2 ^ 0, 2 ^ 4, 2 ^ -2
    assert_eq!(result, vec![Atom::Int(2), Atom::Int(6), Atom::Int(-4)]);
}

#[test]
fn set_operand_bitwise_ops_cover_all_ten_fields() {
    let operand = Atom::set([Atom::Int(1), Atom::Int(2)]);
    let result = values(sample().combine(&operand, Operator::BitXor, Side::Left, None).unwrap());
    assert_eq!(result.len(), 10);
    assert_eq!(result[0], Atom::set([Atom::Bool(false), Atom::Int(1), Atom::Int(2)]));
    // {1, 4} ^ {1, 2} drops the shared element.
    assert_eq!(result[5], Atom::set([Atom::Int(4), Atom::Int(2)]));

    let result = values(sample().combine(&operand, Operator::BitAnd, Side::Right, None).unwrap());
    assert_eq!(result[5], Atom::set([Atom::Int(1)]));
    assert_eq!(result[0], Atom::set([] as [Atom; 0]));
}

#[test]
fn addition_of_a_set_routes_to_union() {
    let operand = Atom::set([Atom::Int(9)]);
    let result = values(sample().combine(&operand, Operator::Add, Side::Left, None).unwrap());
    assert_eq!(result[8], Atom::set([Atom::Int(1), Atom::Int(6), Atom::Int(9)]));
}

#[test]
fn frozen_set_operands_produce_frozen_sets() {
    let operand = Atom::frozen_set([Atom::Int(9)]);
    let result = values(sample().combine(&operand, Operator::BitOr, Side::Left, None).unwrap());
    assert!(matches!(result[0], Atom::FrozenSet(_)));
}

#[test]
fn in_place_addition_of_a_number_updates_through_the_slots() {
    let mut composite = sample();
    composite.combine_assign(&Atom::Int(4), Operator::Add).unwrap();
    // The boolean slot coerces 0 + 4 back to a boolean.
    assert_eq!(composite.slot(Field::Boolean).get().unwrap(), Atom::Bool(true));
    assert_eq!(composite.slot(Field::Integer).get().unwrap(), Atom::Int(8));
    assert_eq!(composite.slot(Field::FloatNum).get().unwrap(), Atom::Float(1.5));
    assert_eq!(
        composite.slot(Field::ComplexNum).get().unwrap(),
        Atom::Complex(Complex64::new(7.0, -2.0))
    );
    // Container fields are untouched by a numeric operand.
    assert_eq!(composite.slot(Field::String).get().unwrap(), Atom::from("sing"));
}

#[test]
fn in_place_addition_of_text_skips_the_mapping_field() {
    let mut composite = sample();
    composite.combine_assign(&Atom::from("xy"), Operator::Add).unwrap();
    assert_eq!(composite.slot(Field::String).get().unwrap(), Atom::from("singxy"));
    assert_eq!(
        composite.slot(Field::Array).get().unwrap(),
        Atom::list(vec![Atom::Int(1), Atom::Int(4), Atom::from("x"), Atom::from("y")])
    );
    // The mapping field is skipped entirely.
    let mut expected = AtomMap::default();
    expected.insert(Atom::Int(5), Atom::from("5"));
    assert_eq!(composite.slot(Field::Dictionary).get().unwrap(), Atom::Dict(expected));
    // Set fields union with the operand's characters.
    assert_eq!(
        composite.slot(Field::Set).get().unwrap(),
        Atom::set([Atom::Int(1), Atom::Int(6), Atom::from("x"), Atom::from("y")])
    );
    // Numeric fields are untouched by a container operand.
    assert_eq!(composite.slot(Field::Integer).get().unwrap(), Atom::Int(4));
}

#[test]
fn in_place_shift_round_trips_a_non_negative_integer_field() {
    let mut composite = CompositeValue::with_fields(FieldInit {
        integer: Some(Atom::Int(6)),
        ..FieldInit::default()
    })
    .unwrap();
    composite.combine_assign(&Atom::Int(4), Operator::LShift).unwrap();
    assert_eq!(composite.slot(Field::Integer).get().unwrap(), Atom::Int(96));
    composite.combine_assign(&Atom::Int(4), Operator::RShift).unwrap();
    assert_eq!(composite.slot(Field::Integer).get().unwrap(), Atom::Int(6));
}

#[test]
fn in_place_set_ops_touch_only_the_set_fields() {
    let mut composite = sample();
    composite
        .combine_assign(&Atom::set([Atom::Int(1), Atom::Int(12)]), Operator::BitAnd)
        .unwrap();
    assert_eq!(composite.slot(Field::Set).get().unwrap(), Atom::set([Atom::Int(1)]));
    assert_eq!(
        composite.slot(Field::FrozenSet).get().unwrap(),
        Atom::frozen_set([Atom::Int(12)])
    );
    // Everything before the set fields is untouched.
    assert_eq!(composite.slot(Field::Integer).get().unwrap(), Atom::Int(4));
    assert_eq!(composite.slot(Field::String).get().unwrap(), Atom::from("sing"));
}

#[test]
fn in_place_divmod_is_rejected() {
    let err = sample().combine_assign(&Atom::Int(2), Operator::Divmod).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::TypeError);
}

#[test]
fn unsupported_pairings_propagate_type_errors() {
    let err = sample()
        .combine(&Atom::from("text"), Operator::Sub, Side::Left, None)
        .unwrap_err();
    assert_eq!(err.exc_type(), ExcType::TypeError);
    assert!(err.to_string().contains("'bool' and 'str'"));

    let err = sample()
        .combine(&Atom::Float(1.5), Operator::BitAnd, Side::Left, None)
        .unwrap_err();
    assert_eq!(err.exc_type(), ExcType::TypeError);
}
