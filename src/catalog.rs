//! The fixed set of contract operations a run picks from.

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt, Specifier},
    json_abi::JsonAbi,
    primitives::{Bytes, U256},
};
use rand::{seq::SliceRandom, Rng};

use crate::error::ChainError;

/// Value attached to payable operations: 0.001 ether.
pub const TRANSFER_AMOUNT: U256 = U256::from_limbs([1_000_000_000_000_000, 0, 0, 0]);

pub const RANDOM_INT_LOW: u64 = 1;
pub const RANDOM_INT_HIGH: u64 = 100;

/// How the arguments of an operation are produced on each trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterRule {
    None,
    /// One argument drawn uniformly from `low..=high`.
    RandomInt { low: u64, high: u64 },
    /// No argument, the amount is sent as the transaction value.
    FixedValueTransfer(U256),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSpec {
    pub name: &'static str,
    pub rule: ParameterRule,
    pub payable: bool,
}

/// Arguments and value resolved for one trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCall {
    pub operation: &'static str,
    pub args: Vec<u64>,
    pub value: U256,
}

const fn plain(name: &'static str) -> OperationSpec {
    OperationSpec {
        name,
        rule: ParameterRule::None,
        payable: false,
    }
}

const fn with_int(name: &'static str) -> OperationSpec {
    OperationSpec {
        name,
        rule: ParameterRule::RandomInt {
            low: RANDOM_INT_LOW,
            high: RANDOM_INT_HIGH,
        },
        payable: false,
    }
}

const fn with_value(name: &'static str) -> OperationSpec {
    OperationSpec {
        name,
        rule: ParameterRule::FixedValueTransfer(TRANSFER_AMOUNT),
        payable: true,
    }
}

/// Every operation of the interaction contract, in declaration order.
pub static OPERATIONS: [OperationSpec; 30] = [
    with_int("setValue"),
    plain("getValue"),
    plain("incrementValue"),
    plain("decrementValue"),
    plain("resetValue"),
    with_int("isGreaterThan"),
    plain("saveHistory"),
    plain("getHistory"),
    plain("resetHistory"),
    plain("historyCount"),
    with_int("multiplyValue"),
    with_int("divideValue"),
    plain("isEven"),
    plain("isOdd"),
    with_int("updateHistory"),
    plain("removeHistory"),
    plain("getMaxHistoryValue"),
    plain("getMinHistoryValue"),
    plain("getSumHistory"),
    plain("getAverageHistory"),
    with_int("setUserValue"),
    plain("getUserValue"),
    plain("incrementUserValue"),
    plain("decrementUserValue"),
    with_int("transferUserValue"),
    plain("getContractBalance"),
    with_value("donate"),
    with_int("withdraw"),
    plain("getTimestamp"),
    plain("getBlockNumber"),
];

/// Uniform draw with replacement.
pub fn select<'a, R: Rng + ?Sized>(
    catalog: &'a [OperationSpec],
    rng: &mut R,
) -> Option<&'a OperationSpec> {
    catalog.choose(rng)
}

impl OperationSpec {
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> ResolvedCall {
        let (args, value) = match self.rule {
            ParameterRule::None => (Vec::new(), U256::ZERO),
            ParameterRule::RandomInt { low, high } => (vec![rng.gen_range(low..=high)], U256::ZERO),
            ParameterRule::FixedValueTransfer(amount) => (Vec::new(), amount),
        };

        ResolvedCall {
            operation: self.name,
            args,
            value,
        }
    }
}

impl ResolvedCall {
    /// ABI encode the call, coercing integer arguments to the declared parameter types.
    pub fn encode(&self, abi: &JsonAbi) -> Result<Bytes, ChainError> {
        let function = abi
            .function(self.operation)
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == self.args.len()))
            .ok_or_else(|| {
                ChainError::InvalidCall(format!(
                    "contract has no `{}` taking {} argument(s)",
                    self.operation,
                    self.args.len()
                ))
            })?;

        let values = function
            .inputs
            .iter()
            .zip(&self.args)
            .map(|(param, arg)| {
                let ty = param
                    .resolve()
                    .map_err(|e| ChainError::InvalidCall(e.to_string()))?;
                ty.coerce_str(&arg.to_string()).map_err(|e| {
                    ChainError::InvalidCall(format!(
                        "`{}` cannot take {arg} as {}: {e}",
                        self.operation, param.ty
                    ))
                })
            })
            .collect::<Result<Vec<DynSolValue>, _>>()?;

        function
            .abi_encode_input(&values)
            .map(Bytes::from)
            .map_err(|e| ChainError::InvalidCall(e.to_string()))
    }
}
