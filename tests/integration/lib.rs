// End-to-end marketplace lifecycle tests driving the registry through a real
// Stellar asset contract, the way a wallet-connected client would.

#![cfg(test)]

use property_registry::{
    Error, PropertyRegistryContract, PropertyRegistryContractClient, PropertyStatus, Role,
};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token, Address, Env, String,
};

const T0: u64 = 1_700_000_000;
const DAY: u64 = 86_400;

struct MarketplaceFixture {
    env: Env,
    admin: Address,
    registry: PropertyRegistryContractClient<'static>,
    registry_id: Address,
    token: token::Client<'static>,
    token_admin: token::StellarAssetClient<'static>,
}

impl MarketplaceFixture {
    fn setup() -> Self {
        let env = Env::default();
        env.mock_all_auths();
        env.ledger().with_mut(|l| {
            l.timestamp = T0;
        });

        let admin = Address::generate(&env);
        let token_issuer = Address::generate(&env);
        let token_id = env.register_stellar_asset_contract(token_issuer);

        let registry_id = env.register_contract(None, PropertyRegistryContract);
        let registry = PropertyRegistryContractClient::new(&env, &registry_id);
        registry.initialize(&admin, &token_id);

        let token = token::Client::new(&env, &token_id);
        let token_admin = token::StellarAssetClient::new(&env, &token_id);

        MarketplaceFixture {
            env,
            admin,
            registry,
            registry_id,
            token,
            token_admin,
        }
    }

    /// Walk a fresh address through the request/approve workflow and mint a
    /// property with it.
    fn onboard_and_mint(&self, owner: &Address) -> u64 {
        self.registry.request_mint_role(
            owner,
            &String::from_str(&self.env, "https://example.com/deed.pdf"),
        );
        self.registry.approve_mint_role(&self.admin, owner, &true);
        self.registry.mint_property(
            owner,
            &String::from_str(&self.env, "Harbor House"),
            &String::from_str(&self.env, "3 Quay Road"),
            &String::from_str(&self.env, "Waterfront house with mooring"),
            &String::from_str(&self.env, "ipfs://QmHarborHouse"),
        )
    }

    fn fund(&self, account: &Address, amount: i128) {
        self.token_admin.mint(account, &amount);
    }
}

#[test]
fn full_sale_lifecycle_with_commission_split() {
    let f = MarketplaceFixture::setup();
    let seller = Address::generate(&f.env);
    let buyer = Address::generate(&f.env);
    let verifier = Address::generate(&f.env);

    let property_id = f.onboard_and_mint(&seller);
    assert_eq!(property_id, 0);

    // A dedicated verifier attests the listing.
    f.registry.assign_role(&f.admin, &Role::Verifier, &verifier);
    f.registry.verify_property(&verifier, &property_id, &true);

    f.registry
        .set_listing(&seller, &property_id, &10_000, &true, &0, &false);
    f.fund(&buyer, 10_000);
    f.registry.buy_property(&buyer, &property_id, &10_000);

    let property = f.registry.get_property_info(&property_id);
    assert_eq!(property.owner, buyer);
    assert_eq!(property.status, PropertyStatus::None);

    // 2.5% default commission: 9_750 to the seller, 250 to the platform.
    assert_eq!(f.registry.user_balance(&seller), 9_750);
    assert_eq!(f.registry.user_balance(&f.admin), 250);

    assert_eq!(f.registry.withdraw(&seller), 9_750);
    assert_eq!(f.registry.withdraw(&f.admin), 250);
    assert_eq!(f.token.balance(&seller), 9_750);
    assert_eq!(f.token.balance(&f.admin), 250);
    assert_eq!(f.token.balance(&f.registry_id), 0);

    // Nothing left to claim.
    assert_eq!(f.registry.try_withdraw(&seller), Err(Ok(Error::NoBalance)));
}

#[test]
fn rental_lifecycle_with_lazy_expiry() {
    let f = MarketplaceFixture::setup();
    let landlord = Address::generate(&f.env);
    let tenant = Address::generate(&f.env);
    let next_tenant = Address::generate(&f.env);

    let property_id = f.onboard_and_mint(&landlord);
    f.registry.verify_property(&f.admin, &property_id, &true);
    f.registry
        .set_listing(&landlord, &property_id, &0, &false, &100, &true);

    f.fund(&tenant, 3_000);
    f.registry.rent_property(&tenant, &property_id, &30, &3_000);

    let property = f.registry.get_property_info(&property_id);
    assert_eq!(property.current_tenant, Some(tenant.clone()));
    assert_eq!(property.rental_end, T0 + 30 * DAY);

    // The tenant cannot walk away early; expiry is only observed when
    // end_rental is called, there is no scheduler.
    assert_eq!(
        f.registry.try_end_rental(&tenant, &property_id),
        Err(Ok(Error::RentalNotExpired))
    );

    f.env.ledger().with_mut(|l| {
        l.timestamp = T0 + 31 * DAY;
    });
    f.registry.end_rental(&tenant, &property_id);

    let property = f.registry.get_property_info(&property_id);
    assert_eq!(property.current_tenant, None);
    assert_eq!(property.status, PropertyStatus::ForRent);

    // Straight back into the rentable pool.
    f.fund(&next_tenant, 700);
    f.registry
        .rent_property(&next_tenant, &property_id, &7, &700);
    assert_eq!(
        f.registry.get_property_info(&property_id).current_tenant,
        Some(next_tenant)
    );
}

#[test]
fn value_is_conserved_across_mixed_activity() {
    let f = MarketplaceFixture::setup();
    let seller = Address::generate(&f.env);
    let landlord = Address::generate(&f.env);
    let buyer = Address::generate(&f.env);
    let tenant = Address::generate(&f.env);

    let sale_id = f.onboard_and_mint(&seller);
    let rent_id = f.onboard_and_mint(&landlord);
    f.registry.verify_property(&f.admin, &sale_id, &true);
    f.registry.verify_property(&f.admin, &rent_id, &true);
    f.registry
        .set_listing(&seller, &sale_id, &40_000, &true, &0, &false);
    f.registry
        .set_listing(&landlord, &rent_id, &0, &false, &250, &true);

    f.fund(&buyer, 50_000);
    f.fund(&tenant, 5_000);
    f.registry.buy_property(&buyer, &sale_id, &45_000);
    f.registry.rent_property(&tenant, &rent_id, &20, &5_000);

    // Exactly price + rent total entered the contract, regardless of the
    // higher offers.
    let inflow = 40_000 + 250 * 20;
    assert_eq!(f.token.balance(&f.registry_id), inflow);

    // Every credited unit is accounted for: pending balances sum to the
    // contract's holdings.
    let pending = f.registry.user_balance(&seller)
        + f.registry.user_balance(&landlord)
        + f.registry.user_balance(&f.admin);
    assert_eq!(pending, inflow);

    // Draining all balances empties the contract.
    f.registry.withdraw(&seller);
    f.registry.withdraw(&landlord);
    f.registry.withdraw(&f.admin);
    assert_eq!(f.token.balance(&f.registry_id), 0);
    assert_eq!(
        f.token.balance(&buyer) + f.token.balance(&tenant),
        50_000 + 5_000 - inflow
    );
}

#[test]
fn reviews_and_likes_follow_the_property() {
    let f = MarketplaceFixture::setup();
    let owner = Address::generate(&f.env);
    let guest_a = Address::generate(&f.env);
    let guest_b = Address::generate(&f.env);

    let property_id = f.onboard_and_mint(&owner);

    let first = f.registry.add_review(
        &guest_a,
        &property_id,
        &String::from_str(&f.env, "Lovely stay, would book again"),
        &5,
    );
    let second = f.registry.add_review(
        &guest_b,
        &property_id,
        &String::from_str(&f.env, "Decent but noisy"),
        &3,
    );
    assert_eq!((first, second), (0, 1));

    assert_eq!(
        f.registry.try_add_review(
            &owner,
            &property_id,
            &String::from_str(&f.env, "Best house on the street"),
            &5
        ),
        Err(Ok(Error::SelfReview))
    );

    f.registry.toggle_like(&guest_a, &property_id);
    f.registry.toggle_like(&guest_b, &property_id);
    assert_eq!(f.registry.get_property_info(&property_id).like_count, 2);

    // The platform moderates the noisy review away.
    f.registry.delete_review(&f.admin, &second);
    let review_ids = f.registry.get_property_review_ids(&property_id);
    assert_eq!(review_ids.len(), 1);
    assert_eq!(review_ids.get(0), Some(first));
    assert_eq!(
        f.registry.try_get_review_details(&second),
        Err(Ok(Error::NotFound))
    );
}

#[test]
fn pause_blocks_the_market_but_not_withdrawals() {
    let f = MarketplaceFixture::setup();
    let seller = Address::generate(&f.env);
    let buyer = Address::generate(&f.env);

    let property_id = f.onboard_and_mint(&seller);
    f.registry.verify_property(&f.admin, &property_id, &true);
    f.registry
        .set_listing(&seller, &property_id, &10_000, &true, &0, &false);
    f.fund(&buyer, 10_000);
    f.registry.buy_property(&buyer, &property_id, &10_000);

    f.registry.pause(&f.admin);
    assert_eq!(
        f.registry
            .try_set_listing(&buyer, &property_id, &20_000, &true, &0, &false),
        Err(Ok(Error::ContractPaused))
    );
    assert_eq!(
        f.registry.try_transfer_property(&buyer, &seller, &property_id),
        Err(Ok(Error::ContractPaused))
    );

    // Funds owed before the pause remain claimable.
    assert_eq!(f.registry.withdraw(&seller), 9_750);

    f.registry.unpause(&f.admin);
    f.registry
        .set_listing(&buyer, &property_id, &20_000, &true, &0, &false);
    assert_eq!(
        f.registry.get_property_info(&property_id).status,
        PropertyStatus::ForSale
    );
}
