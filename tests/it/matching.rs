extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use proxymock::handler::ObjectHandler;
use proxymock::*;

#[derive(PartialEq, Debug)]
struct Seed {
    grams: u32,
}

fn samples() -> [Value; 7] {
    [
        Value::Null,
        Value::from(false),
        Value::from(-1_i8),
        Value::from(f32::NAN),
        Value::from(Aggregate::new("Pair", [1_u8, 2])),
        Value::from(Handle::new(Seed { grams: 3 })),
        Value::from(Handle::opaque(|| ())),
    ]
}

#[test]
fn equal_comparator_is_reflexive_for_equatable_values() {
    for sample in samples() {
        if sample.satisfies(Capability::Equality) {
            assert!(Comparator::EQUAL.compare(&sample, &sample.clone()), "{sample:?}");
        }
    }
}

#[test]
fn any_comparator_accepts_mismatched_categories() {
    for lhs in samples() {
        for rhs in samples() {
            assert!(Comparator::ANY.compare(&lhs, &rhs));
        }
    }
}

#[test]
fn wildcard_matches_every_value() {
    for sample in samples() {
        assert!(any().matches(&sample));
    }
}

#[test]
fn value_matchers_agree_with_their_comparator() {
    for captured in samples() {
        for comparator in [Comparator::EQUAL, Comparator::IDENTITY, Comparator::ANY] {
            let matcher = ArgumentMatcher::from_value(captured.clone(), comparator);
            for candidate in samples() {
                assert_eq!(
                    comparator.compare(&captured, &candidate),
                    matcher.matches(&candidate)
                );
            }
        }
    }
}

#[test]
fn custom_comparator() {
    fn same_sign(lhs: &Value, rhs: &Value) -> bool {
        match (lhs, rhs) {
            (Value::Int(lhs), Value::Int(rhs)) => lhs.to_i128().signum() == rhs.to_i128().signum(),
            _ => false,
        }
    }
    const SAME_SIGN: Comparator = Comparator::new("same sign", same_sign);

    let mock = Mock::new("Thermometer");
    mock.given(
        "isFreezing:",
        [ArgumentMatcher::from_value(-1_i32, SAME_SIGN)],
    )
    .will_return(true);

    let mut invocation = Invocation::new("isFreezing:")
        .arg(Argument::primitive(-40_i32))
        .returns(TypeSignature::Bool);
    mock.dispatch(&mut invocation).unwrap();
    assert_eq!(Some(true), invocation.return_primitive::<bool>());
}

#[test]
fn signatures_of_different_length_never_match() {
    let one = CallSignature::from([any()]);
    let two = CallSignature::from([any(), any()]);
    assert!(!one.matches(&two));
    assert!(!two.matches(&one));
    assert!(!CallSignature::default().matches(&one));
}

#[test]
fn collection_and_predicate_matchers() {
    let mock = Mock::new("Feeder");
    mock.given("accepts:", [any_of(["seed", "worm"])]).will_return(true);
    mock.given("accepts:", [not_null()]).will_return(false);
    mock.given("weighs:", [any_where(|value| matches!(value, Value::Int(grams) if grams.to_i128() > 100))])
        .will_return("heavy");

    let accepts = |food: Option<&str>| {
        let mut invocation = Invocation::new("accepts:")
            .arg(Argument::object(food.map(|food| Handle::new(String::from(food)))))
            .returns(TypeSignature::Bool);
        mock.dispatch(&mut invocation).map(|_| invocation.return_primitive::<bool>())
    };

    // The later `not_null` stub shadows `any_of` for every non-null value.
    assert_eq!(Some(false), accepts(Some("seed")).unwrap());
    assert!(accepts(None).is_err());

    let mut weighs = Invocation::new("weighs:")
        .arg(Argument::primitive(250_u16))
        .returns(TypeSignature::Object);
    mock.dispatch(&mut weighs).unwrap();
    assert!(weighs.return_value().unwrap().structural_eq(&Value::from("heavy")));
}

#[test]
fn boxed_matchers_in_example_calls() {
    let mock = Mock::new("Feeder");
    let example = Invocation::new("accepts:")
        .arg(Argument::object(Some(Handle::opaque(any()))))
        .returns(TypeSignature::Bool);
    mock.when(&example).unwrap().will_return(true);

    let mut call = Invocation::new("accepts:")
        .arg(Argument::object(Some(Handle::new(Seed { grams: 1 }))))
        .returns(TypeSignature::Bool);
    mock.dispatch(&mut call).unwrap();
    assert_eq!(Some(true), call.return_primitive::<bool>());
}

#[test]
fn identity_matching_for_objects_without_equality() {
    let chain = Arc::new(
        HandlerChain::builder()
            .standard_handlers()
            .handler(ObjectHandler::by_identity())
            .build(),
    );
    let mock = Mock::builder("Nest").handlers(chain).build();

    let egg = Handle::opaque(|| "egg");
    mock.given("hatch:", [same(egg.clone())]).will_return(true);

    let mut same_egg = Invocation::new("hatch:")
        .arg(Argument::object(Some(egg)))
        .returns(TypeSignature::Bool);
    mock.dispatch(&mut same_egg).unwrap();
    assert_eq!(Some(true), same_egg.return_primitive::<bool>());

    let mut other_egg = Invocation::new("hatch:")
        .arg(Argument::object(Some(Handle::opaque(|| "egg"))))
        .returns(TypeSignature::Bool);
    assert!(matches!(
        mock.dispatch(&mut other_egg),
        Err(MockError::MissingStubbedImplementation { .. })
    ));
}

#[cfg(any(feature = "std", feature = "spin-lock"))]
#[test]
fn captor_collects_arguments() {
    let mock = Mock::new("Feeder");
    let captor = ArgumentCaptor::new();
    mock.given("feed:", [captor.matcher()]).will_return(Value::Null);

    for grams in [5_u32, 7] {
        let mut invocation = Invocation::new("feed:").arg(Argument::object(Some(Handle::new(
            Seed { grams },
        ))));
        mock.dispatch(&mut invocation).unwrap();
    }

    let captured: alloc::vec::Vec<u32> = captor
        .values()
        .iter()
        .filter_map(|value| value.as_handle()?.downcast_ref::<Seed>().map(|seed| seed.grams))
        .collect();
    assert_eq!(alloc::vec![5, 7], captured);
}

#[cfg(any(feature = "std", feature = "spin-lock"))]
#[test]
fn captor_fires_once_per_unmatched_call() {
    let mock = Mock::new("Perch");
    let captor = ArgumentCaptor::new();
    mock.given("land:at:", [captor.matcher(), value(1_i32)])
        .will_return(true);

    let mut call = Invocation::new("land:at:")
        .arg(Argument::primitive(5_i32))
        .arg(Argument::primitive(2_i32))
        .returns(TypeSignature::Bool);
    assert!(mock.dispatch(&mut call).is_err());
    assert_eq!(1, captor.values().len());

    assert_eq!(1, mock.verify("land:at:", [captor.matcher(), any()]).count());
    assert_eq!(2, captor.values().len());
}

#[test]
fn zero_stubs_match_negative_zero() {
    let mock = Mock::new("Scale");
    mock.given("set:", [value(0.0_f64)]).will_return(true);
    mock.given("tare:", [value(f64::NAN)]).will_return(true);

    let call = |selector: &'static str, weight: f64| {
        let mut invocation = Invocation::new(selector)
            .arg(Argument::primitive(weight))
            .returns(TypeSignature::Bool);
        mock.dispatch(&mut invocation).map(|_| invocation.return_primitive::<bool>())
    };

    assert_eq!(Some(true), call("set:", -0.0).unwrap());
    assert_eq!(Some(true), call("set:", 0.0).unwrap());
    assert!(call("set:", 0.5).is_err());
    assert_eq!(Some(true), call("tare:", f64::NAN).unwrap());
}

#[test]
fn predicates_may_call_back_into_the_mock() {
    for layout in [ContextLayout::Split, ContextLayout::Combined] {
        let mock = Mock::builder("Feeder").layout(layout).build();

        let inner = mock.clone();
        mock.given(
            "feed:",
            [any_where(move |_| {
                inner.given("refill", CallSignature::default()).will_return(true);
                !inner.calls().is_empty()
            })],
        )
        .will_return(true);

        let mut invocation = Invocation::new("feed:")
            .arg(Argument::primitive(1_u8))
            .returns(TypeSignature::Bool);
        mock.dispatch(&mut invocation).unwrap();
        assert_eq!(Some(true), invocation.return_primitive::<bool>());

        let inner = mock.clone();
        let pattern = [any_where(move |_| inner.calls().len() == 1)];
        assert_eq!(1, mock.verify("feed:", pattern).count());

        // The stub holds a clone of the mock.
        mock.reset();
    }
}

#[test]
fn tolerance_and_length_matchers() {
    let mock = Mock::new("Bird");
    mock.given("canChirp:", [around(42.0, 0.1)]).will_return(true);
    mock.given("greet:", [not_empty()]).will_return(true);
    mock.given("pair:", [any_count(exactly(2))]).will_return(true);

    let mut loud = Invocation::new("canChirp:")
        .arg(Argument::primitive(42.05_f64))
        .returns(TypeSignature::Bool);
    mock.dispatch(&mut loud).unwrap();
    assert_eq!(Some(true), loud.return_primitive::<bool>());

    let mut quiet = Invocation::new("canChirp:")
        .arg(Argument::primitive(41.5_f64))
        .returns(TypeSignature::Bool);
    assert!(mock.dispatch(&mut quiet).is_err());

    let text_call = |selector: &'static str, text: &str| {
        let mut invocation = Invocation::new(selector)
            .arg(Argument::object(Some(Handle::new(String::from(text)))))
            .returns(TypeSignature::Bool);
        mock.dispatch(&mut invocation).is_ok()
    };

    assert!(text_call("greet:", "hi"));
    assert!(!text_call("greet:", ""));
    assert!(text_call("pair:", "ok"));
    assert!(!text_call("pair:", "okay"));
}
