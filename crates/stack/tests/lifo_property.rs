//! Property tests checking the container against a plain `Vec` model

use proptest::prelude::*;

use vigil_stack::{FaultMask, GuardedStack, StackError, provenance};

#[derive(Debug, Clone)]
enum Op {
    Push(i64),
    Pop,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<i64>().prop_map(Op::Push),
        2 => Just(Op::Pop),
    ]
}

proptest! {
    #[test]
    fn pops_reverse_pushes(values in proptest::collection::vec(any::<i32>(), 0..200)) {
        let mut stack = GuardedStack::new(0, provenance!("prop-lifo")).unwrap();
        for &value in &values {
            stack.push(value).unwrap();
        }
        prop_assert_eq!(stack.len(), values.len());

        for &expected in values.iter().rev() {
            prop_assert_eq!(stack.pop().unwrap(), expected);
        }
        prop_assert!(stack.is_empty());
        prop_assert!(stack.check().is_clean());
    }

    #[test]
    fn matches_a_vec_model(ops in proptest::collection::vec(op_strategy(), 0..300)) {
        let mut stack = GuardedStack::new(0, provenance!("prop-model")).unwrap();
        let mut model: Vec<i64> = Vec::new();

        for op in ops {
            match op {
                Op::Push(value) => {
                    stack.push(value).unwrap();
                    model.push(value);
                }
                Op::Pop => match model.pop() {
                    Some(expected) => prop_assert_eq!(stack.pop().unwrap(), expected),
                    None => prop_assert_eq!(
                        stack.pop().unwrap_err(),
                        StackError::Faulted(FaultMask::WRONG_SIZE)
                    ),
                },
            }
            prop_assert_eq!(stack.len(), model.len());
            prop_assert!(stack.check().is_clean());
            prop_assert!(stack.capacity() >= stack.len());
        }
    }
}
