extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use proxymock::handler::{
    AggregateHandler, HandlerResult, NumericHandler, OutParameterHandler, PrimitiveHandler,
};
use proxymock::*;

use crate::bird::point;

#[test]
fn narrow_handler_before_broad_one_wins() {
    let chain = HandlerChain::builder()
        .handler(PrimitiveHandler::<i32>::new())
        .handler(NumericHandler)
        .build();
    let invocation = Invocation::new("count:").arg(Argument::primitive(32_i32));

    let selected = chain.encoder(0, &invocation).unwrap();
    assert_eq!("i32", selected.name());
}

#[test]
fn broad_handler_before_narrow_one_shadows_it() {
    let chain = HandlerChain::builder()
        .handler(NumericHandler)
        .handler(PrimitiveHandler::<i32>::new())
        .build();
    let invocation = Invocation::new("count:").arg(Argument::primitive(32_i32));

    assert_eq!("numeric", chain.encoder(0, &invocation).unwrap().name());
}

#[test]
fn standard_chain_order() {
    let names: Vec<&str> = HandlerChain::standard().names().take(4).collect();
    assert_eq!(
        alloc::vec!["out-parameter", "block", "object", "aggregate"],
        names
    );
}

#[test]
fn out_parameters_are_wildcards_whatever_they_hold() {
    let chain = HandlerChain::standard();
    for content in [None, Some(Handle::new(1_i32)), Some(Handle::opaque(|| ()))] {
        let out = OutPointer::new();
        out.set(content);
        let invocation = Invocation::new("save:").arg(Argument::out_object(out));

        assert!(chain.encode(0, &invocation).unwrap().is_wildcard());
    }
}

#[test]
fn out_parameter_handler_never_decodes() {
    let invocation = Invocation::new("error").returns(TypeSignature::OutObject);
    assert!(!OutParameterHandler.can_decode(&Value::Null, &invocation));
}

fn round_trip(argument: Argument) {
    let signature = *argument.signature();
    let mock = Mock::new("Echo");

    let example = Invocation::new("echo:").arg(argument.clone());
    let matcher = mock.handlers().encode(0, &example).unwrap();
    mock.given("echo:", [any()])
        .will_return(matcher.captured_value().unwrap().clone());

    let mut call = Invocation::new("echo:").arg(argument.clone()).returns(signature);
    mock.dispatch(&mut call).unwrap();

    match (argument.raw_value(), call.raw_return().unwrap()) {
        (RawArgument::Bytes(expected), RawArgument::Bytes(actual)) => {
            assert_eq!(expected, actual, "{signature}")
        }
        (RawArgument::Object(Some(expected)), RawArgument::Object(Some(actual))) => {
            assert!(expected.ptr_eq(actual), "{signature}")
        }
        (RawArgument::Object(None), RawArgument::Object(None)) => {}
        _ => panic!("{signature}: return slot has the wrong shape"),
    }
}

#[test]
fn values_round_trip_bit_for_bit() {
    round_trip(Argument::primitive(true));
    round_trip(Argument::primitive(i8::MIN));
    round_trip(Argument::primitive(-12345_i16));
    round_trip(Argument::primitive(i32::MAX));
    round_trip(Argument::primitive(i64::MIN + 1));
    round_trip(Argument::primitive(u8::MAX));
    round_trip(Argument::primitive(65535_u16));
    round_trip(Argument::primitive(0xdead_beef_u32));
    round_trip(Argument::primitive(u64::MAX));
    round_trip(Argument::primitive(-0.0_f32));
    round_trip(Argument::primitive(f32::from_bits(0x7fc0_0001)));
    round_trip(Argument::primitive(core::f64::consts::PI));
    round_trip(Argument::aggregate(point(-3, 9)));
    round_trip(Argument::object(Some(Handle::new(String::from("feather")))));
    round_trip(Argument::object(None));
}

#[test]
fn block_arguments_are_captured_but_match_anything() {
    let mock = Mock::new("Timer");
    let example = Invocation::new("after:").arg(Argument::block(Handle::opaque(|| 1)));
    mock.when(&example).unwrap().will_return(true);

    let mut call = Invocation::new("after:")
        .arg(Argument::block(Handle::opaque(|| 2)))
        .returns(TypeSignature::Bool);
    mock.dispatch(&mut call).unwrap();
    assert_eq!(Some(true), call.return_primitive::<bool>());
}

#[test]
fn named_aggregate_handler_rejects_other_aggregates() {
    let chain = Arc::new(
        HandlerChain::builder()
            .handler(AggregateHandler::named("Point"))
            .build(),
    );
    let mock = Mock::builder("Map").handlers(chain).build();

    let mut size = Invocation::new("scale:").arg(Argument::aggregate(Aggregate::new("Size", [0_u8; 8])));
    assert!(matches!(
        mock.dispatch(&mut size),
        Err(MockError::UnsupportedType {
            position: Position::Argument(0),
            ..
        })
    ));
}

/// Handles untyped pointers by address.
struct AddressHandler;

impl InvocationHandler for AddressHandler {
    fn name(&self) -> &'static str {
        "address"
    }

    fn claims(&self, signature: &TypeSignature) -> bool {
        *signature == TypeSignature::Pointer
    }

    fn required_capability(&self) -> Option<Capability> {
        Some(Capability::Integer)
    }

    fn encode(&self, position: usize, invocation: &Invocation) -> HandlerResult<ArgumentMatcher> {
        let bytes = invocation.argument(position).and_then(Argument::bytes).unwrap_or_default();
        let address = usize::from_ne_bytes(bytes.try_into().unwrap_or_default());
        Ok(value(address as u64))
    }

    fn decode(&self, value: &Value, invocation: &mut Invocation) -> HandlerResult<()> {
        let address = <u64 as Primitive>::from_value(value).unwrap_or_default() as usize;
        invocation.set_raw_return(RawArgument::Bytes(address.to_ne_bytes().to_vec()));
        Ok(())
    }
}

#[test]
fn custom_handlers_extend_the_chain() {
    let chain = Arc::new(
        HandlerChain::builder()
            .standard_handlers()
            .handler(AddressHandler)
            .build(),
    );
    let mock = Mock::builder("Allocator").handlers(chain).build();
    mock.given("realloc:", [value(0x1000_u64)]).will_return(0x2000_u64);

    let mut call = Invocation::new("realloc:")
        .arg(Argument::raw(
            TypeSignature::Pointer,
            RawArgument::Bytes(0x1000_usize.to_ne_bytes().to_vec()),
        ))
        .returns(TypeSignature::Pointer);
    mock.dispatch(&mut call).unwrap();

    match call.raw_return() {
        Some(RawArgument::Bytes(bytes)) => assert_eq!(&0x2000_usize.to_ne_bytes()[..], &bytes[..]),
        _ => panic!("pointer was not written"),
    }
}

#[test]
fn pointers_are_unsupported_by_the_standard_chain() {
    let mock = Mock::new("Allocator");
    let mut call = Invocation::new("free:").arg(Argument::raw(
        TypeSignature::Pointer,
        RawArgument::Bytes(alloc::vec![0; 8]),
    ));

    let error = mock.dispatch(&mut call).unwrap_err();
    assert!(matches!(
        error,
        MockError::UnsupportedType {
            signature: TypeSignature::Pointer,
            ..
        }
    ));
    assert!(mock.calls().is_empty());
}
