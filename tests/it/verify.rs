extern crate alloc;

use alloc::format;
use proxymock::*;

use crate::bird::{Bird, BirdMock};

fn chirpy_bird() -> BirdMock {
    let bird = BirdMock::new();
    bird.0.given("canChirp:", [any()]).will_return(true);
    bird
}

#[test]
fn unstubbed_calls_are_still_verifiable() {
    let mock = Mock::new("Bird");
    let mut invocation = Invocation::new("canFly").returns(TypeSignature::Bool);
    let _ = mock.dispatch(&mut invocation);

    mock.verify("canFly", CallSignature::default())
        .was_called(once())
        .unwrap();
}

#[test]
fn count_matchers() {
    let bird = chirpy_bird();
    for volume in [1, 5, 5, 9] {
        bird.can_chirp(volume);
    }

    let verify = |pattern: ArgumentMatcher, count: CountMatcher| {
        bird.0.verify("canChirp:", [pattern]).was_called(count)
    };

    verify(any(), exactly(4)).unwrap();
    verify(value(5_i32), exactly(2)).unwrap();
    verify(any_of([1_i32, 9]), between(1..=2)).unwrap();
    verify(any_where(|volume| matches!(volume, Value::Int(v) if v.to_i128() > 3)), at_least(3))
        .unwrap();
    verify(value(7_i32), at_most(0)).unwrap();
    assert!(verify(value(5_i32), once()).is_err());
}

#[test]
fn never_called() {
    let bird = chirpy_bird();
    bird.can_chirp(1);

    bird.0.verify("canChirp:", [value(2_i32)]).was_never_called().unwrap();
    let error = bird.0.verify("canChirp:", [value(1_i32)]).was_never_called().unwrap_err();
    assert_eq!(
        "'Bird.canChirp:' with arguments [1]: Expected to be called exactly 0 times, but it was actually called 1 time.",
        format!("{error}")
    );
}

#[test]
fn in_order_verification() {
    let bird = chirpy_bird();
    let tree = Mock::new("Tree");

    bird.can_chirp(1);
    tree.dispatch(&mut Invocation::new("rustle")).unwrap();
    bird.can_chirp(2);

    let mut in_order = InOrder::new();
    in_order.verify(&bird.0.verify("canChirp:", [value(1_i32)])).unwrap();
    in_order.verify(&tree.verify("rustle", CallSignature::default())).unwrap();
    in_order.verify(&bird.0.verify("canChirp:", [value(2_i32)])).unwrap();

    let mut wrong_order = InOrder::new();
    wrong_order.verify(&tree.verify("rustle", CallSignature::default())).unwrap();
    let error = wrong_order
        .verify(&bird.0.verify("canChirp:", [value(1_i32)]))
        .unwrap_err();
    assert_eq!(
        "'Bird.canChirp:' with arguments [1]: Not called after 'Tree.rustle'.",
        format!("{error}")
    );
}

#[test]
fn in_order_step_for_a_call_that_never_happened() {
    let bird = chirpy_bird();
    let error = InOrder::new()
        .verify(&bird.0.verify("canChirp:", [any()]))
        .unwrap_err();
    assert_eq!(
        "'Bird.canChirp:' with arguments [any()]: Never called.",
        format!("{error}")
    );
}

#[test]
fn clearing_invocations_resets_counts() {
    let bird = chirpy_bird();
    bird.can_chirp(1);
    bird.0.clear_invocations();

    bird.0.verify("canChirp:", [any()]).was_never_called().unwrap();
    assert!(bird.can_chirp(1));
}
