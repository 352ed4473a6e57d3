//! In-memory chain that records every remote call, for tests.

use super::{RemoteError, SigningCapability, Submitted, SwapperContract, TokenContract};
use crate::errors::SwapError;
use crate::models::PoolId;
use crate::wallet::{Session, WalletProvider};
use async_trait::async_trait;
use ethers::types::{Address, H256, TxHash, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    CreatePool {
        token0: Address,
        token1: Address,
        amount0: U256,
        amount1: U256,
        swap_fee: U256,
    },
    GetPoolId {
        token0: Address,
        token1: Address,
    },
    Swap {
        pool_id: PoolId,
        token_in: Address,
        amount_in: U256,
    },
    AddToken {
        token: Address,
    },
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    approve_failures: HashMap<Address, String>,
    pools: HashMap<(Address, Address), PoolId>,
    pool_lookup_failure: Option<String>,
    swap_failure: Option<String>,
    create_pool_failure: Option<String>,
    add_token_failure: Option<String>,
    stall_swap: bool,
    signing_delay: Option<Duration>,
}

/// Scriptable stand-in for the chain. Clones share state.
#[derive(Clone)]
pub struct MockChain {
    account: Address,
    state: Arc<Mutex<State>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            account: Address::repeat_byte(0xee),
            state: Arc::default(),
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    /// A session already connected to this chain.
    pub fn session(&self) -> Session {
        Session::connected(self.account, Arc::new(self.clone()))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(*c)).count()
    }

    pub fn with_pool(self, token0: Address, token1: Address, id: PoolId) -> Self {
        self.lock().pools.insert((token0, token1), id);
        self
    }

    pub fn fail_approve(&self, token: Address, reason: &str) {
        self.lock().approve_failures.insert(token, reason.to_string());
    }

    pub fn heal_approve(&self, token: Address) {
        self.lock().approve_failures.remove(&token);
    }

    pub fn fail_pool_lookup(&self, reason: &str) {
        self.lock().pool_lookup_failure = Some(reason.to_string());
    }

    pub fn fail_swap(&self, reason: &str) {
        self.lock().swap_failure = Some(reason.to_string());
    }

    pub fn fail_create_pool(&self, reason: &str) {
        self.lock().create_pool_failure = Some(reason.to_string());
    }

    pub fn fail_add_token(&self, reason: &str) {
        self.lock().add_token_failure = Some(reason.to_string());
    }

    /// The swap is broadcast but never mined.
    pub fn stall_swap(&self) {
        self.lock().stall_swap = true;
    }

    /// Every mutating call spends `delay` being signed before it is broadcast.
    pub fn slow_signing(&self, delay: Duration) {
        self.lock().signing_delay = Some(delay);
    }

    async fn sign(&self) {
        let delay = self.lock().signing_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("mock state poisoned")
    }

    fn record(&self, call: Call) -> TxHash {
        let mut state = self.lock();
        state.calls.push(call);
        H256::from_low_u64_be(state.calls.len() as u64)
    }
}

impl SigningCapability for MockChain {
    fn account(&self) -> Address {
        self.account
    }

    fn token(&self, address: Address) -> Arc<dyn TokenContract> {
        Arc::new(MockToken {
            chain: self.clone(),
            address,
        })
    }

    fn swapper(&self, address: Address) -> Arc<dyn SwapperContract> {
        Arc::new(MockSwapper {
            chain: self.clone(),
            address,
        })
    }
}

struct MockToken {
    chain: MockChain,
    address: Address,
}

#[async_trait]
impl TokenContract for MockToken {
    fn address(&self) -> Address {
        self.address
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<Submitted, RemoteError> {
        self.chain.sign().await;
        let tx = self.chain.record(Call::Approve {
            token: self.address,
            spender,
            amount,
        });
        match self.chain.lock().approve_failures.get(&self.address) {
            Some(reason) => Err(RemoteError::new(reason.clone())),
            None => Ok(mined(tx)),
        }
    }
}

struct MockSwapper {
    chain: MockChain,
    address: Address,
}

#[async_trait]
impl SwapperContract for MockSwapper {
    fn address(&self) -> Address {
        self.address
    }

    async fn create_pool(
        &self,
        token0: Address,
        token1: Address,
        amount0: U256,
        amount1: U256,
        swap_fee: U256,
    ) -> Result<Submitted, RemoteError> {
        self.chain.sign().await;
        let tx = self.chain.record(Call::CreatePool {
            token0,
            token1,
            amount0,
            amount1,
            swap_fee,
        });
        let mut state = self.chain.lock();
        if let Some(reason) = &state.create_pool_failure {
            return Err(RemoteError::new(reason.clone()));
        }
        state
            .pools
            .insert((token0, token1), PoolId(H256::from_low_u64_be(0xf00d)));
        Ok(mined(tx))
    }

    async fn get_pool_id(&self, token0: Address, token1: Address) -> Result<PoolId, RemoteError> {
        self.chain.record(Call::GetPoolId { token0, token1 });
        let state = self.chain.lock();
        if let Some(reason) = &state.pool_lookup_failure {
            return Err(RemoteError::new(reason.clone()));
        }
        Ok(state
            .pools
            .get(&(token0, token1))
            .copied()
            .unwrap_or(PoolId(H256::zero())))
    }

    async fn swap(
        &self,
        pool_id: PoolId,
        token_in: Address,
        amount_in: U256,
    ) -> Result<Submitted, RemoteError> {
        self.chain.sign().await;
        let tx = self.chain.record(Call::Swap {
            pool_id,
            token_in,
            amount_in,
        });
        let (stall, failure) = {
            let state = self.chain.lock();
            (state.stall_swap, state.swap_failure.clone())
        };
        // Reverts surface from the receipt, after broadcast.
        Ok(Submitted::new(tx, async move {
            if stall {
                std::future::pending::<()>().await;
            }
            match failure {
                Some(reason) => Err(RemoteError::new(reason)),
                None => Ok(()),
            }
        }))
    }

    async fn add_token(&self, token: Address) -> Result<Submitted, RemoteError> {
        self.chain.sign().await;
        let tx = self.chain.record(Call::AddToken { token });
        match &self.chain.lock().add_token_failure {
            Some(reason) => Err(RemoteError::new(reason.clone())),
            None => Ok(mined(tx)),
        }
    }
}

fn mined(tx: TxHash) -> Submitted {
    Submitted::new(tx, async { Ok(()) })
}

/// Wallet provider over a [`MockChain`] that counts its prompts.
pub struct MockWallet {
    chain: MockChain,
    answer: Result<Vec<Address>, SwapError>,
    prompts: AtomicUsize,
}

impl MockWallet {
    pub fn granting(chain: MockChain) -> Self {
        let account = chain.account();
        Self::with_accounts(chain, vec![account])
    }

    pub fn denying(chain: MockChain) -> Self {
        Self {
            chain,
            answer: Err(SwapError::UserDenied),
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn with_accounts(chain: MockChain, accounts: Vec<Address>) -> Self {
        Self {
            chain,
            answer: Ok(accounts),
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, SwapError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }

    fn signer(&self) -> Arc<dyn SigningCapability> {
        Arc::new(self.chain.clone())
    }
}
