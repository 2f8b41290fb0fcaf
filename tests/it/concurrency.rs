use std::sync::Arc;
use std::thread;

use proxymock::*;

fn tick(mock: &Mock, worker: u32) -> bool {
    let mut invocation = Invocation::new("tick:")
        .arg(Argument::primitive(worker))
        .returns(TypeSignature::Bool);
    mock.invoke(&mut invocation);
    invocation.return_primitive().unwrap()
}

#[test]
fn calls_from_many_threads_are_all_recorded() {
    let mock = Mock::new("Clock");
    mock.given("tick:", [any()]).will_return(true);

    let workers: Vec<_> = (0..8)
        .map(|worker| {
            let mock = mock.clone();
            thread::spawn(move || (0..100).all(|_| tick(&mock, worker)))
        })
        .collect();

    for worker in workers {
        assert!(worker.join().unwrap());
    }

    mock.verify("tick:", [any()]).was_called(exactly(800)).unwrap();
    mock.verify("tick:", [value(3_u32)]).was_called(exactly(100)).unwrap();
}

#[test]
fn sequence_numbers_are_unique_across_threads() {
    let mock = Mock::new("Clock");
    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let mock = mock.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    mock.dispatch(&mut Invocation::new("tock:").arg(Argument::primitive(worker)))
                        .unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let mut sequences: Vec<usize> = mock.calls().iter().map(CallRecord::sequence).collect();
    sequences.sort_unstable();
    sequences.dedup();
    assert_eq!(200, sequences.len());
}

#[test]
fn failure_on_another_thread_is_kept() {
    let mock = Mock::new("Clock");
    let worker = {
        let mock = mock.clone();
        thread::spawn(move || tick(&mock, 1))
    };

    assert!(worker.join().is_err());
    assert_eq!(1, mock.panic_reasons().len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shared_from_tokio_tasks() {
    let mock = Mock::builder("Clock")
        .layout(ContextLayout::Combined)
        .build();
    mock.given("tick:", [any()]).will(|args| {
        let worker = <u32 as FromValue>::from_value(&args[0]).unwrap_or_default();
        Value::from(worker % 2 == 0)
    });

    let tasks: Vec<_> = (0..16_u32)
        .map(|worker| {
            let mock = mock.clone();
            tokio::spawn(async move { tick(&mock, worker) })
        })
        .collect();

    let mut even = 0;
    for task in tasks {
        if task.await.unwrap() {
            even += 1;
        }
    }

    assert_eq!(8, even);
    assert_eq!(16, mock.calls().len());
}

#[test]
fn standard_chain_is_built_once_across_threads() {
    let chains: Vec<Arc<HandlerChain>> = (0..4)
        .map(|_| thread::spawn(HandlerChain::standard))
        .map(|worker| worker.join().unwrap())
        .collect();

    assert!(chains.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}
