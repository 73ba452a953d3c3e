// crates/keel-depository/src/depository.rs
//
// The bond ledger.
//
// Product and bond ids are monotonically increasing and never reused.
// Deleted records simply disappear from the tables; lookups of absent ids
// fall back to zeroed reads, which is what makes "not found" and "expired"
// (or "already redeemed") collapse into single error kinds.

use std::collections::{HashMap, HashSet};

use keel_core::traits::{BondPricer, CollateralBank, EpochLedger, RewardToken};
use keel_core::{Address, Amount, KeelError, Timestamp, MAX_BOND_SUPPLY};
use keel_treasury::Treasury;

use crate::product::{Bond, Product};

/// The bond depository. Exclusively owns the product and bond tables.
pub struct Depository {
    address: Address,
    owner: Address,
    /// Minimum vesting period for new products, in seconds.
    min_vesting: u64,
    product_counter: u64,
    bond_counter: u64,
    products: HashMap<u64, Product>,
    bonds: HashMap<u64, Bond>,
}

impl Depository {
    pub fn new(address: Address, owner: Address, min_vesting: u64) -> Self {
        Self {
            address,
            owner,
            min_vesting,
            product_counter: 0,
            bond_counter: 0,
            products: HashMap::new(),
            bonds: HashMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn require_owner(&self, caller: &Address, action: &'static str) -> Result<(), KeelError> {
        if *caller != self.owner {
            return Err(KeelError::Unauthorized {
                caller: *caller,
                action,
            });
        }
        Ok(())
    }

    /// Open a new bond product. Owner-only.
    ///
    /// The supply is reserved against the accountant's bond-issuance cap up
    /// front; a declined reservation rejects the product and reports the
    /// cap's current headroom.
    #[allow(clippy::too_many_arguments)]
    pub fn create_product(
        &mut self,
        caller: &Address,
        now: Timestamp,
        token: &Address,
        price: Amount,
        supply: Amount,
        vesting: u64,
        tokenomics: &mut dyn EpochLedger,
        treasury: &Treasury,
    ) -> Result<u64, KeelError> {
        self.require_owner(caller, "create product")?;
        if price == 0 {
            return Err(KeelError::ZeroValue { what: "price" });
        }
        if supply == 0 {
            return Err(KeelError::ZeroValue { what: "supply" });
        }
        if supply > MAX_BOND_SUPPLY {
            return Err(KeelError::Overflow {
                value: supply,
                bound: MAX_BOND_SUPPLY,
            });
        }
        if vesting < self.min_vesting {
            return Err(KeelError::VestingTooShort {
                vesting,
                minimum: self.min_vesting,
            });
        }
        let expiry = now.checked_add(vesting).ok_or(KeelError::Overflow {
            value: now as u128 + vesting as u128,
            bound: u64::MAX as u128,
        })?;
        if !treasury.is_token_enabled(token) {
            return Err(KeelError::TokenNotEnabled { token: *token });
        }
        if !tokenomics.reserve_for_bond_program(supply) {
            return Err(KeelError::ReservationDeclined {
                requested: supply,
                headroom: tokenomics.bond_program_headroom(),
            });
        }

        let product_id = self.product_counter;
        self.product_counter += 1;
        self.products.insert(
            product_id,
            Product {
                token: *token,
                price,
                supply,
                expiry,
            },
        );

        tracing::info!(product_id, %token, price, supply, expiry, "bond product created");
        Ok(product_id)
    }

    /// Purchase a bond from a product: pay `token_amount` of its collateral,
    /// receive a claim on the priced payout that matures at the product's
    /// expiry. Returns (payout, maturity, bond id).
    #[allow(clippy::too_many_arguments)]
    pub fn purchase_bond(
        &mut self,
        caller: &Address,
        now: Timestamp,
        product_id: u64,
        token_amount: Amount,
        pricer: &dyn BondPricer,
        tokenomics: &mut dyn EpochLedger,
        treasury: &mut Treasury,
        reward_token: &mut dyn RewardToken,
        collateral: &mut dyn CollateralBank,
    ) -> Result<(Amount, Timestamp, u64), KeelError> {
        if token_amount == 0 {
            return Err(KeelError::ZeroValue {
                what: "token amount",
            });
        }
        // An absent product reads expiry 0: uniformly expired.
        let (token, price, supply, expiry) = match self.products.get(&product_id) {
            Some(product) if product.expiry >= now => {
                (product.token, product.price, product.supply, product.expiry)
            }
            _ => return Err(KeelError::ProductExpired { product_id }),
        };
        let payout = pricer.payout_for(token_amount, price)?;
        if payout > supply {
            return Err(KeelError::InsufficientSupply {
                requested: payout,
                remaining: supply,
            });
        }

        if let Some(product) = self.products.get_mut(&product_id) {
            product.supply -= payout;
        }
        let bond_id = self.bond_counter;
        self.bond_counter += 1;
        self.bonds.insert(
            bond_id,
            Bond {
                account: *caller,
                payout,
                maturity: expiry,
                product_id,
            },
        );

        if let Err(e) = treasury.deposit_token_for_mint(
            &self.address,
            caller,
            token_amount,
            &token,
            payout,
            tokenomics,
            reward_token,
            collateral,
        ) {
            // Roll the purchase back so the failed call commits nothing.
            self.bonds.remove(&bond_id);
            self.bond_counter -= 1;
            if let Some(product) = self.products.get_mut(&product_id) {
                product.supply += payout;
            }
            return Err(e);
        }

        tracing::info!(product_id, bond_id, %caller, payout, maturity = expiry, "bond purchased");
        Ok((payout, expiry, bond_id))
    }

    /// Redeem a batch of matured bonds owned by the caller. The accumulated
    /// payout is transferred in a single call at the end; a batch that
    /// accumulates zero payout (including the empty batch) is a failure.
    ///
    /// The first redemption that touches a still-open product force-closes
    /// it: unused supply returns to the bond-issuance cap and the record is
    /// deleted. Later bonds from the same product skip this.
    pub fn redeem_bonds(
        &mut self,
        caller: &Address,
        now: Timestamp,
        bond_ids: &[u64],
        tokenomics: &mut dyn EpochLedger,
        reward_token: &mut dyn RewardToken,
    ) -> Result<Amount, KeelError> {
        let mut total: Amount = 0;
        let mut seen = HashSet::new();
        for &bond_id in bond_ids {
            // A repeated id reads as already redeemed.
            if !seen.insert(bond_id) {
                return Err(KeelError::BondNotRedeemable { bond_id });
            }
            let bond = self
                .bonds
                .get(&bond_id)
                .ok_or(KeelError::BondNotRedeemable { bond_id })?;
            if bond.maturity > now {
                return Err(KeelError::BondNotRedeemable { bond_id });
            }
            if bond.account != *caller {
                return Err(KeelError::Unauthorized {
                    caller: *caller,
                    action: "redeem bond",
                });
            }
            total += bond.payout;
        }
        if total == 0 {
            return Err(KeelError::ZeroValue { what: "payout" });
        }

        reward_token.transfer(&self.address, caller, total)?;

        for &bond_id in bond_ids {
            let bond = match self.bonds.remove(&bond_id) {
                Some(bond) => bond,
                None => continue,
            };
            if let Some(product) = self.products.remove(&bond.product_id) {
                tokenomics.refund_from_bond_program(product.supply);
                tracing::info!(
                    product_id = bond.product_id,
                    refunded = product.supply,
                    "product force-closed on redemption"
                );
            }
        }

        tracing::info!(%caller, total, bonds = bond_ids.len(), "bonds redeemed");
        Ok(total)
    }

    /// Close products and refund their unused supply. Owner-only; the whole
    /// call fails if any listed id is already closed.
    pub fn close_products(
        &mut self,
        caller: &Address,
        product_ids: &[u64],
        tokenomics: &mut dyn EpochLedger,
    ) -> Result<(), KeelError> {
        self.require_owner(caller, "close products")?;
        for &product_id in product_ids {
            if !self.products.contains_key(&product_id) {
                return Err(KeelError::ProductClosed { product_id });
            }
        }
        for &product_id in product_ids {
            if let Some(product) = self.products.remove(&product_id) {
                tokenomics.refund_from_bond_program(product.supply);
                tracing::info!(product_id, refunded = product.supply, "product closed");
            }
        }
        Ok(())
    }

    /// Ids and cumulative payout of the caller's outstanding bonds,
    /// optionally filtered to matured ones.
    pub fn pending_bonds(
        &self,
        account: &Address,
        matured_only: bool,
        now: Timestamp,
    ) -> (Vec<u64>, Amount) {
        let mut ids: Vec<u64> = self
            .bonds
            .iter()
            .filter(|(_, b)| b.account == *account && (!matured_only || b.maturity <= now))
            .map(|(&id, _)| id)
            .collect();
        ids.sort_unstable();
        let payout = ids.iter().map(|id| self.bonds[id].payout).sum();
        (ids, payout)
    }

    /// Payout and maturity status of a single bond. An unknown or redeemed
    /// bond reads as (0, false).
    pub fn bond_status(&self, bond_id: u64, now: Timestamp) -> (Amount, bool) {
        self.bonds
            .get(&bond_id)
            .map(|b| (b.payout, b.maturity <= now))
            .unwrap_or((0, false))
    }

    /// Ids of active (sellable) or inactive (sold-out or expired, not yet
    /// closed) products.
    pub fn product_ids(&self, active: bool, now: Timestamp) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .products
            .iter()
            .filter(|(_, p)| (p.supply > 0 && p.expiry >= now) == active)
            .map(|(&id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Proxy the current collateral price from the pricing capability.
    pub fn current_price(&self, token: &Address, pricer: &dyn BondPricer) -> Amount {
        pricer.current_price(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricer::FixedRatePricer;
    use keel_core::bank::{CollateralLedger, TokenLedger};
    use keel_core::{ProtocolConfig, TOKEN_SCALE};
    use keel_tokenomics::Tokenomics;

    const WEEK: u64 = 7 * 24 * 60 * 60;
    const DAY: u64 = 24 * 60 * 60;

    fn addr(byte: u8) -> Address {
        Address([byte; 32])
    }

    fn owner() -> Address {
        addr(1)
    }

    fn buyer() -> Address {
        addr(5)
    }

    fn collateral_token() -> Address {
        addr(20)
    }

    struct Fixture {
        depository: Depository,
        treasury: Treasury,
        tokenomics: Tokenomics,
        pricer: FixedRatePricer,
        reward: TokenLedger,
        bank: CollateralLedger,
    }

    fn make_fixture() -> Fixture {
        let depository = Depository::new(addr(2), owner(), DAY);
        let mut treasury = Treasury::new(addr(10), owner(), addr(2), addr(3));
        let tokenomics = Tokenomics::new(owner(), ProtocolConfig::default(), 0).unwrap();
        let mut pricer = FixedRatePricer::new();
        let mut bank = CollateralLedger::new();

        treasury.enable_token(&owner(), &collateral_token()).unwrap();
        pricer.set_price(&collateral_token(), 2 * TOKEN_SCALE);
        bank.set_balance(&collateral_token(), &buyer(), 1_000_000);

        Fixture {
            depository,
            treasury,
            tokenomics,
            pricer,
            reward: TokenLedger::new(),
            bank,
        }
    }

    fn create_default_product(f: &mut Fixture, now: Timestamp, supply: Amount) -> u64 {
        f.depository
            .create_product(
                &owner(),
                now,
                &collateral_token(),
                2 * TOKEN_SCALE,
                supply,
                WEEK,
                &mut f.tokenomics,
                &f.treasury,
            )
            .unwrap()
    }

    #[test]
    fn test_create_product_assigns_monotonic_ids() {
        let mut f = make_fixture();
        assert_eq!(create_default_product(&mut f, 0, 1000), 0);
        assert_eq!(create_default_product(&mut f, 0, 1000), 1);
    }

    #[test]
    fn test_create_product_rejects_zero_price_and_supply() {
        let mut f = make_fixture();
        let err = f.depository.create_product(
            &owner(),
            0,
            &collateral_token(),
            0,
            1000,
            WEEK,
            &mut f.tokenomics,
            &f.treasury,
        );
        assert!(matches!(err, Err(KeelError::ZeroValue { what: "price" })));

        let err = f.depository.create_product(
            &owner(),
            0,
            &collateral_token(),
            TOKEN_SCALE,
            0,
            WEEK,
            &mut f.tokenomics,
            &f.treasury,
        );
        assert!(matches!(err, Err(KeelError::ZeroValue { what: "supply" })));
    }

    #[test]
    fn test_create_product_rejects_supply_over_bound() {
        let mut f = make_fixture();
        let err = f.depository.create_product(
            &owner(),
            0,
            &collateral_token(),
            TOKEN_SCALE,
            MAX_BOND_SUPPLY + 1,
            WEEK,
            &mut f.tokenomics,
            &f.treasury,
        );
        assert!(matches!(
            err,
            Err(KeelError::Overflow { bound: MAX_BOND_SUPPLY, .. })
        ));
    }

    #[test]
    fn test_create_product_rejects_short_vesting() {
        let mut f = make_fixture();
        let err = f.depository.create_product(
            &owner(),
            0,
            &collateral_token(),
            TOKEN_SCALE,
            1000,
            DAY - 1,
            &mut f.tokenomics,
            &f.treasury,
        );
        assert!(matches!(err, Err(KeelError::VestingTooShort { .. })));
    }

    #[test]
    fn test_create_product_rejects_expiry_overflow() {
        let mut f = make_fixture();
        let err = f.depository.create_product(
            &owner(),
            u64::MAX - 10,
            &collateral_token(),
            TOKEN_SCALE,
            1000,
            WEEK,
            &mut f.tokenomics,
            &f.treasury,
        );
        assert!(matches!(err, Err(KeelError::Overflow { .. })));
    }

    #[test]
    fn test_create_product_rejects_disabled_token() {
        let mut f = make_fixture();
        let err = f.depository.create_product(
            &owner(),
            0,
            &addr(77),
            TOKEN_SCALE,
            1000,
            WEEK,
            &mut f.tokenomics,
            &f.treasury,
        );
        assert!(matches!(err, Err(KeelError::TokenNotEnabled { .. })));
    }

    #[test]
    fn test_create_product_reports_reservation_headroom() {
        let mut f = make_fixture();
        let headroom = f.tokenomics.bond_program_headroom();
        let err = f.depository.create_product(
            &owner(),
            0,
            &collateral_token(),
            TOKEN_SCALE,
            headroom + 1,
            WEEK,
            &mut f.tokenomics,
            &f.treasury,
        );
        match err {
            Err(KeelError::ReservationDeclined {
                requested,
                headroom: reported,
            }) => {
                assert_eq!(requested, headroom + 1);
                assert_eq!(reported, headroom);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_create_product_owner_only() {
        let mut f = make_fixture();
        let err = f.depository.create_product(
            &buyer(),
            0,
            &collateral_token(),
            TOKEN_SCALE,
            1000,
            WEEK,
            &mut f.tokenomics,
            &f.treasury,
        );
        assert!(matches!(err, Err(KeelError::Unauthorized { .. })));
    }

    // Scenario: price 2.0, supply 1000, vesting one week; a purchase paying
    // out 100 leaves 900 supply and a bond maturing at now + one week.
    #[test]
    fn test_purchase_and_redeem_lifecycle() {
        let mut f = make_fixture();
        let product_id = create_default_product(&mut f, 0, 1000);

        // 50 collateral at price 2.0 => payout 100
        let (payout, maturity, bond_id) = f
            .depository
            .purchase_bond(
                &buyer(),
                0,
                product_id,
                50,
                &f.pricer,
                &mut f.tokenomics,
                &mut f.treasury,
                &mut f.reward,
                &mut f.bank,
            )
            .unwrap();
        assert_eq!(payout, 100);
        assert_eq!(maturity, WEEK);
        assert_eq!(f.depository.products[&product_id].supply, 900);

        // Conservation: collateral reserve grew by exactly the amount paid.
        assert_eq!(f.treasury.token_reserve(&collateral_token()), 50);
        assert_eq!(f.reward.balance_of(&f.depository.address()), 100);

        // Not yet matured
        let err = f.depository.redeem_bonds(
            &buyer(),
            maturity - 1,
            &[bond_id],
            &mut f.tokenomics,
            &mut f.reward,
        );
        assert!(matches!(err, Err(KeelError::BondNotRedeemable { .. })));

        // Past maturity the payout transfers and the bond is destroyed.
        let total = f
            .depository
            .redeem_bonds(&buyer(), maturity, &[bond_id], &mut f.tokenomics, &mut f.reward)
            .unwrap();
        assert_eq!(total, 100);
        assert_eq!(f.reward.balance_of(&buyer()), 100);
        assert_eq!(f.depository.bond_status(bond_id, maturity), (0, false));

        // Second redemption of the same id fails.
        let err = f.depository.redeem_bonds(
            &buyer(),
            maturity,
            &[bond_id],
            &mut f.tokenomics,
            &mut f.reward,
        );
        assert!(matches!(err, Err(KeelError::BondNotRedeemable { .. })));
    }

    #[test]
    fn test_purchase_rejects_zero_amount() {
        let mut f = make_fixture();
        let product_id = create_default_product(&mut f, 0, 1000);
        let err = f.depository.purchase_bond(
            &buyer(),
            0,
            product_id,
            0,
            &f.pricer,
            &mut f.tokenomics,
            &mut f.treasury,
            &mut f.reward,
            &mut f.bank,
        );
        assert!(matches!(err, Err(KeelError::ZeroValue { .. })));
    }

    #[test]
    fn test_purchase_unknown_product_reads_expired() {
        let mut f = make_fixture();
        let err = f.depository.purchase_bond(
            &buyer(),
            1,
            999,
            50,
            &f.pricer,
            &mut f.tokenomics,
            &mut f.treasury,
            &mut f.reward,
            &mut f.bank,
        );
        assert!(matches!(
            err,
            Err(KeelError::ProductExpired { product_id: 999 })
        ));
    }

    #[test]
    fn test_purchase_after_expiry_rejected() {
        let mut f = make_fixture();
        let product_id = create_default_product(&mut f, 0, 1000);
        let err = f.depository.purchase_bond(
            &buyer(),
            WEEK + 1,
            product_id,
            50,
            &f.pricer,
            &mut f.tokenomics,
            &mut f.treasury,
            &mut f.reward,
            &mut f.bank,
        );
        assert!(matches!(err, Err(KeelError::ProductExpired { .. })));
    }

    #[test]
    fn test_purchase_over_supply_rejected() {
        let mut f = make_fixture();
        let product_id = create_default_product(&mut f, 0, 100);
        // 100 collateral at price 2.0 => payout 200 > supply 100
        let err = f.depository.purchase_bond(
            &buyer(),
            0,
            product_id,
            100,
            &f.pricer,
            &mut f.tokenomics,
            &mut f.treasury,
            &mut f.reward,
            &mut f.bank,
        );
        assert!(matches!(
            err,
            Err(KeelError::InsufficientSupply {
                requested: 200,
                remaining: 100
            })
        ));
    }

    #[test]
    fn test_redeem_wrong_account_rejected() {
        let mut f = make_fixture();
        let product_id = create_default_product(&mut f, 0, 1000);
        let (_, maturity, bond_id) = f
            .depository
            .purchase_bond(
                &buyer(),
                0,
                product_id,
                50,
                &f.pricer,
                &mut f.tokenomics,
                &mut f.treasury,
                &mut f.reward,
                &mut f.bank,
            )
            .unwrap();
        let err = f.depository.redeem_bonds(
            &addr(6),
            maturity,
            &[bond_id],
            &mut f.tokenomics,
            &mut f.reward,
        );
        assert!(matches!(err, Err(KeelError::Unauthorized { .. })));
    }

    #[test]
    fn test_redeem_empty_batch_is_zero_payout_failure() {
        let mut f = make_fixture();
        let err = f
            .depository
            .redeem_bonds(&buyer(), 0, &[], &mut f.tokenomics, &mut f.reward);
        assert!(matches!(err, Err(KeelError::ZeroValue { .. })));
    }

    #[test]
    fn test_redeem_duplicate_id_rejected() {
        let mut f = make_fixture();
        let product_id = create_default_product(&mut f, 0, 1000);
        let (_, maturity, bond_id) = f
            .depository
            .purchase_bond(
                &buyer(),
                0,
                product_id,
                50,
                &f.pricer,
                &mut f.tokenomics,
                &mut f.treasury,
                &mut f.reward,
                &mut f.bank,
            )
            .unwrap();
        let err = f.depository.redeem_bonds(
            &buyer(),
            maturity,
            &[bond_id, bond_id],
            &mut f.tokenomics,
            &mut f.reward,
        );
        assert!(matches!(err, Err(KeelError::BondNotRedeemable { .. })));
    }

    #[test]
    fn test_redemption_force_closes_product_and_refunds() {
        let mut f = make_fixture();
        let product_id = create_default_product(&mut f, 0, 1000);
        let (_, maturity, bond_id) = f
            .depository
            .purchase_bond(
                &buyer(),
                0,
                product_id,
                50,
                &f.pricer,
                &mut f.tokenomics,
                &mut f.treasury,
                &mut f.reward,
                &mut f.bank,
            )
            .unwrap();

        let headroom_before = f.tokenomics.bond_program_headroom();
        f.depository
            .redeem_bonds(&buyer(), maturity, &[bond_id], &mut f.tokenomics, &mut f.reward)
            .unwrap();
        // The 900 unsold supply returned to the cap; the product is gone.
        assert_eq!(f.tokenomics.bond_program_headroom(), headroom_before + 900);
        assert!(!f.depository.products.contains_key(&product_id));
    }

    // Scenario: closing a product with 400 unsold refunds the reservation
    // and leaves the id permanently unpurchasable.
    #[test]
    fn test_close_product_refunds_and_expires_id() {
        let mut f = make_fixture();
        let product_id = create_default_product(&mut f, 0, 400);

        let headroom_before = f.tokenomics.bond_program_headroom();
        f.depository
            .close_products(&owner(), &[product_id], &mut f.tokenomics)
            .unwrap();
        assert_eq!(f.tokenomics.bond_program_headroom(), headroom_before + 400);

        let err = f.depository.purchase_bond(
            &buyer(),
            1,
            product_id,
            50,
            &f.pricer,
            &mut f.tokenomics,
            &mut f.treasury,
            &mut f.reward,
            &mut f.bank,
        );
        assert!(matches!(err, Err(KeelError::ProductExpired { .. })));
    }

    #[test]
    fn test_close_products_rejects_closed_id_atomically() {
        let mut f = make_fixture();
        let open_id = create_default_product(&mut f, 0, 1000);
        let headroom_before = f.tokenomics.bond_program_headroom();

        let err = f
            .depository
            .close_products(&owner(), &[open_id, 999], &mut f.tokenomics);
        assert!(matches!(
            err,
            Err(KeelError::ProductClosed { product_id: 999 })
        ));
        // Nothing was refunded or deleted.
        assert_eq!(f.tokenomics.bond_program_headroom(), headroom_before);
        assert!(f.depository.products.contains_key(&open_id));
    }

    #[test]
    fn test_pending_bonds_query() {
        let mut f = make_fixture();
        let early = create_default_product(&mut f, 0, 1000);

        let (_, _, first) = f
            .depository
            .purchase_bond(
                &buyer(),
                0,
                early,
                50,
                &f.pricer,
                &mut f.tokenomics,
                &mut f.treasury,
                &mut f.reward,
                &mut f.bank,
            )
            .unwrap();
        // A later product matures later.
        let late = create_default_product(&mut f, WEEK, 1000);
        let (_, _, second) = f
            .depository
            .purchase_bond(
                &buyer(),
                WEEK,
                late,
                25,
                &f.pricer,
                &mut f.tokenomics,
                &mut f.treasury,
                &mut f.reward,
                &mut f.bank,
            )
            .unwrap();

        let (ids, payout) = f.depository.pending_bonds(&buyer(), false, WEEK);
        assert_eq!(ids, vec![first, second]);
        assert_eq!(payout, 100 + 50);

        // Only the first bond has matured at t = WEEK.
        let (ids, payout) = f.depository.pending_bonds(&buyer(), true, WEEK);
        assert_eq!(ids, vec![first]);
        assert_eq!(payout, 100);
    }

    #[test]
    fn test_product_ids_active_filter() {
        let mut f = make_fixture();
        let first = create_default_product(&mut f, 0, 1000);
        let second = create_default_product(&mut f, 0, 1000);
        // Both early products expire before `now`; only the fresh one sells.
        let now = WEEK + 1;
        let fresh = create_default_product(&mut f, now, 1000);

        assert_eq!(f.depository.product_ids(true, now), vec![fresh]);
        assert_eq!(f.depository.product_ids(false, now), vec![first, second]);
    }
}
