extern crate alloc;

use alloc::format;
use alloc::string::String;
use proxymock::*;

use crate::bird::{Bird, BirdMock};

#[test]
#[should_panic(expected = "'Bird.canChirp:' with arguments [3]: Missing stubbed implementation. No stubs are registered for this selector.")]
fn unstubbed_call_panics() {
    BirdMock::new().can_chirp(3);
}

#[test]
#[should_panic(expected = "'Bird.canChirp:' with arguments [3]: Missing stubbed implementation.\nArgument mismatch for argument #0 (actual / expected):")]
fn mismatched_stub_is_explained() {
    let bird = BirdMock::new();
    bird.0.given("canChirp:", [value(4_i32)]).will_return(true);
    bird.can_chirp(3);
}

#[test]
fn arity_mismatch_is_explained() {
    let mock = Mock::new("Bird");
    mock.given("canChirp:", [any(), any()]).will_return(true);

    let mut invocation = Invocation::new("canChirp:")
        .arg(Argument::primitive(1_i32))
        .returns(TypeSignature::Bool);
    let error = mock.dispatch(&mut invocation).unwrap_err();
    assert!(format!("{error}")
        .contains("Arity mismatch for stub #0: stub expects 2 arguments, but the call has 1."));
}

#[test]
fn unsupported_type_names_call_position_and_signature() {
    let mock = Mock::new("Bird");
    let mut invocation = Invocation::new("preen:").arg(Argument::object(Some(Handle::opaque(|| ()))));

    let error = mock.dispatch(&mut invocation).unwrap_err();
    assert_eq!(
        "'Bird.preen:': Unsupported type `@` for argument #0. No invocation handler claims it.",
        format!("{error}")
    );
}

#[test]
fn return_value_of_wrong_category_is_unsupported() {
    let mock = Mock::new("Bird");
    mock.given("wingspan", CallSignature::default()).will_return("wide");

    let mut invocation = Invocation::new("wingspan").returns(TypeSignature::F64);
    let error = mock.dispatch(&mut invocation).unwrap_err();
    assert_eq!(
        "'Bird.wingspan': Unsupported type `d` for return value. No invocation handler claims it.",
        format!("{error}")
    );
}

#[test]
fn throwing_without_error_out_parameter() {
    let mock = Mock::new("Bird");
    mock.given("land", CallSignature::default())
        .will_throw(Handle::new(String::from("too windy")));

    let error = mock.dispatch(&mut Invocation::new("land")).unwrap_err();
    assert_eq!(
        "'Bird.land': Stubbed to throw, but the call has no error out-parameter.",
        format!("{error}")
    );
}

#[test]
fn read_only_property_has_no_setter() {
    const AGE: PropertyDescriptor = PropertyDescriptor::read_only("age", "age.get");
    let mock = Mock::new("Bird");

    let error = mock
        .set_property(&AGE, Argument::primitive(3_u8))
        .unwrap_err();
    assert_eq!("'Bird.age': Property has no setter.", format!("{error}"));
}

#[cfg(feature = "std")]
#[test]
fn panic_reasons_survive_a_caught_panic() {
    let bird = BirdMock::new();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| bird.can_chirp(1)));

    assert!(result.is_err());
    let reasons = bird.0.panic_reasons();
    assert_eq!(1, reasons.len());
    assert!(matches!(
        reasons[0],
        MockError::MissingStubbedImplementation { .. }
    ));
}
