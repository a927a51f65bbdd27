#![no_std]
use shared_utils::{Pausable, SafeMath, TimeUtils, Validation};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, token, Address, Env, String, Symbol, Vec,
};


/// Commission applied to sales and rentals until the admin changes it, in
/// basis points.
const DEFAULT_COMMISSION_RATE_BPS: u32 = 250;

// ============================================================================
// Error Types
// ============================================================================

/// Contract errors for structured error handling
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    /// Contract has already been initialized
    AlreadyInitialized = 1,
    /// Contract has not been initialized
    NotInitialized = 2,
    /// Caller lacks the required capability or ownership
    Unauthorized = 3,
    /// Referenced property or review does not exist
    NotFound = 4,
    /// Action requires a verified property
    NotVerified = 5,
    /// Property is not listed for sale
    NotForSale = 6,
    /// Property is not available for rent
    NotForRent = 7,
    /// Property has no active rental
    NoActiveRental = 8,
    /// Rental period has not elapsed yet
    RentalNotExpired = 9,
    /// Offered payment is below the required amount
    InsufficientFunds = 10,
    /// Rating outside the 1-5 range
    InvalidRating = 11,
    /// Owners may not review their own property
    SelfReview = 12,
    /// Commission rate outside the allowed bounds
    RateOutOfRange = 13,
    /// Withdrawal attempted with a zero balance
    NoBalance = 14,
    /// Malformed input or invalid state transition
    InvalidArgument = 15,
    /// Contract is paused
    ContractPaused = 16,
    /// Arithmetic operation would overflow
    ArithmeticOverflow = 17,
    /// Reentrant call into a value-moving function
    ReentrancyDetected = 18,
}

impl Error {
    /// Human-readable message for debugging and client UX.
    pub fn message(&self) -> &'static str {
        match self {
            Error::AlreadyInitialized => "Contract already initialized",
            Error::NotInitialized => "Contract not initialized",
            Error::Unauthorized => "Unauthorized: caller not allowed",
            Error::NotFound => "Property or review not found",
            Error::NotVerified => "Property is not verified",
            Error::NotForSale => "Property is not for sale",
            Error::NotForRent => "Property is not available for rent",
            Error::NoActiveRental => "Property has no active rental",
            Error::RentalNotExpired => "Rental period has not elapsed",
            Error::InsufficientFunds => "Insufficient funds",
            Error::InvalidRating => "Rating must be between 1 and 5",
            Error::SelfReview => "Cannot review own property",
            Error::RateOutOfRange => "Commission rate must be between 0 and 10000",
            Error::NoBalance => "No balance",
            Error::InvalidArgument => "Invalid argument",
            Error::ContractPaused => "Contract is paused",
            Error::ArithmeticOverflow => "Arithmetic overflow",
            Error::ReentrancyDetected => "Reentrancy detected",
        }
    }
}

// ============================================================================
// Data Types
// ============================================================================

/// Market availability of a property. Sale and rent are mutually exclusive
/// by construction.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PropertyStatus {
    None,
    ForSale,
    ForRent,
}

/// Grantable capabilities. The address stored at initialization holds the
/// default-admin superset and can grant or revoke all of these.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Role {
    Admin,
    Verifier,
    Minter,
}

/// A registered property record.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Property {
    pub id: u64,
    pub owner: Address,
    pub name: String,
    pub location: String,
    pub description: String,
    pub image_ref: String,
    pub price: i128,
    pub rent_price: i128,
    pub status: PropertyStatus,
    pub is_verified: bool,
    pub current_tenant: Option<Address>,
    pub rental_end: u64,
    pub like_count: u32,
    pub review_ids: Vec<u64>,
    pub created_at: u64,
}

/// A review attached to a property.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Review {
    pub id: u64,
    pub property_id: u64,
    pub reviewer: Address,
    pub content: String,
    pub rating: u32,
    pub created_at: u64,
}

/// A pending or processed request for the minting capability.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MintRequest {
    pub requester: Address,
    pub document_url: String,
    pub approved: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleKey {
    pub role: Role,
    pub account: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LikeKey {
    pub property_id: u64,
    pub account: Address,
}

/// Storage keys for the contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Default-admin address (singleton)
    Admin,
    /// Token used for all payments (singleton)
    PaymentToken,
    /// Commission in basis points (singleton)
    CommissionRate,
    /// Whether listing/detail changes and rentals require verification
    VerificationRequired,
    /// Next property id to allocate
    NextPropertyId,
    /// Next review id to allocate
    NextReviewId,
    /// Reentrancy protection flag
    ReentrancyGuard,
    /// property_id -> Property
    Property(u64),
    /// review_id -> Review
    Review(u64),
    /// owner -> Vec<property_id>
    OwnerProperties(Address),
    /// (role, account) -> bool
    Role(RoleKey),
    /// account -> MintRequest
    MintRequest(Address),
    /// account -> pending withdrawal balance
    Balance(Address),
    /// (property_id, account) -> liked flag
    Liked(LikeKey),
}

// ─── Storage helpers ──────────────────────────────────────────────────────────

fn read_admin(e: &Env) -> Result<Address, Error> {
    e.storage()
        .instance()
        .get::<_, Address>(&DataKey::Admin)
        .ok_or(Error::NotInitialized)
}

fn read_payment_token(e: &Env) -> Result<Address, Error> {
    e.storage()
        .instance()
        .get::<_, Address>(&DataKey::PaymentToken)
        .ok_or(Error::NotInitialized)
}

fn read_commission_rate(e: &Env) -> u32 {
    e.storage()
        .instance()
        .get::<_, u32>(&DataKey::CommissionRate)
        .unwrap_or(DEFAULT_COMMISSION_RATE_BPS)
}

fn verification_gate(e: &Env) -> bool {
    e.storage()
        .instance()
        .get::<_, bool>(&DataKey::VerificationRequired)
        .unwrap_or(true)
}

fn property_count(e: &Env) -> u64 {
    e.storage()
        .instance()
        .get::<_, u64>(&DataKey::NextPropertyId)
        .unwrap_or(0)
}

fn alloc_property_id(e: &Env) -> u64 {
    let id = property_count(e);
    e.storage().instance().set(&DataKey::NextPropertyId, &(id + 1));
    id
}

fn alloc_review_id(e: &Env) -> u64 {
    let id = e
        .storage()
        .instance()
        .get::<_, u64>(&DataKey::NextReviewId)
        .unwrap_or(0);
    e.storage().instance().set(&DataKey::NextReviewId, &(id + 1));
    id
}

fn read_property(e: &Env, property_id: u64) -> Result<Property, Error> {
    e.storage()
        .persistent()
        .get::<_, Property>(&DataKey::Property(property_id))
        .ok_or(Error::NotFound)
}

fn write_property(e: &Env, property: &Property) {
    e.storage()
        .persistent()
        .set(&DataKey::Property(property.id), property);
}

fn read_review(e: &Env, review_id: u64) -> Result<Review, Error> {
    e.storage()
        .persistent()
        .get::<_, Review>(&DataKey::Review(review_id))
        .ok_or(Error::NotFound)
}

fn read_balance(e: &Env, account: &Address) -> i128 {
    e.storage()
        .persistent()
        .get::<_, i128>(&DataKey::Balance(account.clone()))
        .unwrap_or(0)
}

fn write_balance(e: &Env, account: &Address, amount: i128) {
    e.storage()
        .persistent()
        .set(&DataKey::Balance(account.clone()), &amount);
}

fn credit_balance(e: &Env, account: &Address, amount: i128) -> Result<(), Error> {
    let updated =
        SafeMath::add(read_balance(e, account), amount).ok_or(Error::ArithmeticOverflow)?;
    write_balance(e, account, updated);
    Ok(())
}

fn owner_properties(e: &Env, owner: &Address) -> Vec<u64> {
    e.storage()
        .persistent()
        .get::<_, Vec<u64>>(&DataKey::OwnerProperties(owner.clone()))
        .unwrap_or(Vec::new(e))
}

fn add_to_owner_properties(e: &Env, owner: &Address, property_id: u64) {
    let mut ids = owner_properties(e, owner);
    ids.push_back(property_id);
    e.storage()
        .persistent()
        .set(&DataKey::OwnerProperties(owner.clone()), &ids);
}

/// Remove a property from an owner's index, preserving the order of the rest.
fn remove_from_owner_properties(e: &Env, owner: &Address, property_id: u64) {
    let mut ids = owner_properties(e, owner);
    if let Some(idx) = ids.iter().position(|id| id == property_id) {
        ids.remove(idx as u32);
        e.storage()
            .persistent()
            .set(&DataKey::OwnerProperties(owner.clone()), &ids);
    }
}

// ─── Authorization helpers ────────────────────────────────────────────────────

fn role_granted(e: &Env, role: Role, account: &Address) -> bool {
    e.storage()
        .persistent()
        .get::<_, bool>(&DataKey::Role(RoleKey {
            role,
            account: account.clone(),
        }))
        .unwrap_or(false)
}

fn set_role_grant(e: &Env, role: Role, account: &Address, granted: bool) {
    let key = DataKey::Role(RoleKey {
        role,
        account: account.clone(),
    });
    if granted {
        e.storage().persistent().set(&key, &true);
    } else {
        e.storage().persistent().remove(&key);
    }
}

/// The stored admin address holds every capability; an explicit Admin grant
/// confers the same.
fn is_admin(e: &Env, account: &Address) -> Result<bool, Error> {
    Ok(*account == read_admin(e)? || role_granted(e, Role::Admin, account))
}

/// Single authorization gate consulted by every role-gated entry point.
fn require_role(e: &Env, account: &Address, role: Role) -> Result<(), Error> {
    if is_admin(e, account)? || role_granted(e, role, account) {
        Ok(())
    } else {
        Err(Error::Unauthorized)
    }
}

fn require_not_paused(e: &Env) -> Result<(), Error> {
    if Pausable::is_paused(e) {
        Err(Error::ContractPaused)
    } else {
        Ok(())
    }
}

fn require_verified_for_update(e: &Env, property: &Property) -> Result<(), Error> {
    if verification_gate(e) && !property.is_verified {
        Err(Error::NotVerified)
    } else {
        Ok(())
    }
}

// ─── Reentrancy guard ─────────────────────────────────────────────────────────

fn lock_reentrancy(e: &Env) -> Result<(), Error> {
    let locked = e
        .storage()
        .instance()
        .get::<_, bool>(&DataKey::ReentrancyGuard)
        .unwrap_or(false);
    if locked {
        return Err(Error::ReentrancyDetected);
    }
    e.storage().instance().set(&DataKey::ReentrancyGuard, &true);
    Ok(())
}

fn unlock_reentrancy(e: &Env) {
    e.storage().instance().set(&DataKey::ReentrancyGuard, &false);
}

// ============================================================================
// Contract Implementation
// ============================================================================

#[contract]
pub struct PropertyRegistryContract;

#[contractimpl]
impl PropertyRegistryContract {
    // ========================================================================
    // Initialization
    // ========================================================================

    /// Initialize the registry with an admin address and the payment token.
    ///
    /// The admin receives explicit Admin, Verifier and Minter grants and the
    /// commission rate starts at the 250 bp default. Fails with
    /// `AlreadyInitialized` on a second call.
    pub fn initialize(e: Env, admin: Address, payment_token: Address) -> Result<(), Error> {
        if e.storage().instance().has(&DataKey::Admin) {
            return Err(Error::AlreadyInitialized);
        }
        e.storage().instance().set(&DataKey::Admin, &admin);
        e.storage()
            .instance()
            .set(&DataKey::PaymentToken, &payment_token);
        e.storage()
            .instance()
            .set(&DataKey::CommissionRate, &DEFAULT_COMMISSION_RATE_BPS);
        e.storage()
            .instance()
            .set(&DataKey::VerificationRequired, &true);
        e.storage().instance().set(&DataKey::NextPropertyId, &0u64);
        e.storage().instance().set(&DataKey::NextReviewId, &0u64);
        e.storage().instance().set(&Pausable::PAUSED_KEY, &false);

        set_role_grant(&e, Role::Admin, &admin, true);
        set_role_grant(&e, Role::Verifier, &admin, true);
        set_role_grant(&e, Role::Minter, &admin, true);

        e.events().publish(
            (Symbol::new(&e, "Initialized"),),
            (
                admin,
                payment_token,
                DEFAULT_COMMISSION_RATE_BPS,
                TimeUtils::now(&e),
            ),
        );
        Ok(())
    }

    // ========================================================================
    // Pause switch
    // ========================================================================

    /// Pause the market-mutating entry points. Caller must be admin.
    pub fn pause(e: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        require_role(&e, &caller, Role::Admin)?;
        Pausable::pause(&e);
        e.events().publish(
            (Symbol::new(&e, "Paused"),),
            (caller, TimeUtils::now(&e)),
        );
        Ok(())
    }

    /// Unpause the contract. Caller must be admin.
    pub fn unpause(e: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        require_role(&e, &caller, Role::Admin)?;
        Pausable::unpause(&e);
        e.events().publish(
            (Symbol::new(&e, "Unpaused"),),
            (caller, TimeUtils::now(&e)),
        );
        Ok(())
    }

    /// Returns `true` if the contract is currently paused.
    pub fn is_paused(e: Env) -> bool {
        Pausable::is_paused(&e)
    }

    // ========================================================================
    // Minting and verification
    // ========================================================================

    /// Mint a new property owned by the caller.
    ///
    /// Ids are sequential from 0. The caller must hold the Minter capability,
    /// granted directly or through the request/approve workflow.
    pub fn mint_property(
        e: Env,
        caller: Address,
        name: String,
        location: String,
        description: String,
        image_ref: String,
    ) -> Result<u64, Error> {
        caller.require_auth();
        require_not_paused(&e)?;
        require_role(&e, &caller, Role::Minter)?;

        let property_id = alloc_property_id(&e);
        let property = Property {
            id: property_id,
            owner: caller.clone(),
            name: name.clone(),
            location: location.clone(),
            description,
            image_ref,
            price: 0,
            rent_price: 0,
            status: PropertyStatus::None,
            is_verified: false,
            current_tenant: None,
            rental_end: 0,
            like_count: 0,
            review_ids: Vec::new(&e),
            created_at: TimeUtils::now(&e),
        };
        write_property(&e, &property);
        add_to_owner_properties(&e, &caller, property_id);

        e.events().publish(
            (Symbol::new(&e, "PropertyMinted"), property_id),
            (caller, name, location, TimeUtils::now(&e)),
        );
        Ok(property_id)
    }

    /// Set a property's verification flag. Verifier capability required.
    /// Idempotent: re-applying the same value is a no-op beyond the event.
    pub fn verify_property(
        e: Env,
        caller: Address,
        property_id: u64,
        verified: bool,
    ) -> Result<(), Error> {
        caller.require_auth();
        require_role(&e, &caller, Role::Verifier)?;

        let mut property = read_property(&e, property_id)?;
        property.is_verified = verified;
        write_property(&e, &property);

        e.events().publish(
            (Symbol::new(&e, "PropertyVerified"), property_id),
            (verified, caller, TimeUtils::now(&e)),
        );
        Ok(())
    }

    // ========================================================================
    // Listing and metadata
    // ========================================================================

    /// Update a property's market availability and prices.
    ///
    /// At most one of `for_sale`/`for_rent` may be set, and a set flag must
    /// carry a positive price. While a tenancy is active the only accepted
    /// shape is `for_rent = true, for_sale = false` (the rent price may be
    /// adjusted for the next tenancy); end the rental to delist or sell.
    pub fn set_listing(
        e: Env,
        caller: Address,
        property_id: u64,
        sale_price: i128,
        for_sale: bool,
        rent_price: i128,
        for_rent: bool,
    ) -> Result<(), Error> {
        caller.require_auth();
        require_not_paused(&e)?;

        let mut property = read_property(&e, property_id)?;
        if property.owner != caller {
            return Err(Error::Unauthorized);
        }
        if for_sale && for_rent {
            return Err(Error::InvalidArgument);
        }
        if for_sale && !Validation::is_positive(sale_price) {
            return Err(Error::InvalidArgument);
        }
        if for_rent && !Validation::is_positive(rent_price) {
            return Err(Error::InvalidArgument);
        }
        require_verified_for_update(&e, &property)?;
        if property.current_tenant.is_some() && !(for_rent && !for_sale) {
            return Err(Error::InvalidArgument);
        }

        property.status = if for_sale {
            PropertyStatus::ForSale
        } else if for_rent {
            PropertyStatus::ForRent
        } else {
            PropertyStatus::None
        };
        property.price = sale_price;
        property.rent_price = rent_price;
        write_property(&e, &property);

        let listed_price = match property.status {
            PropertyStatus::ForSale => sale_price,
            PropertyStatus::ForRent => rent_price,
            PropertyStatus::None => 0,
        };
        e.events().publish(
            (Symbol::new(&e, "PropertyListed"), property_id),
            (property.status, listed_price, TimeUtils::now(&e)),
        );
        Ok(())
    }

    /// Overwrite a property's descriptive metadata. No price or status
    /// side effects.
    pub fn update_details(
        e: Env,
        caller: Address,
        property_id: u64,
        name: String,
        description: String,
        image_ref: String,
        location: String,
    ) -> Result<(), Error> {
        caller.require_auth();
        require_not_paused(&e)?;

        let mut property = read_property(&e, property_id)?;
        if property.owner != caller {
            return Err(Error::Unauthorized);
        }
        require_verified_for_update(&e, &property)?;

        property.name = name.clone();
        property.description = description.clone();
        property.image_ref = image_ref.clone();
        property.location = location.clone();
        write_property(&e, &property);

        e.events().publish(
            (Symbol::new(&e, "PropertyUpdated"), property_id),
            (name, description, image_ref, location, TimeUtils::now(&e)),
        );
        Ok(())
    }

    /// Toggle whether listing changes, detail updates and rentals require a
    /// verified property. Admin only.
    pub fn set_verification_required(
        e: Env,
        caller: Address,
        required: bool,
    ) -> Result<(), Error> {
        caller.require_auth();
        require_role(&e, &caller, Role::Admin)?;
        e.storage()
            .instance()
            .set(&DataKey::VerificationRequired, &required);
        e.events().publish(
            (Symbol::new(&e, "VerificationGate"),),
            (required, caller, TimeUtils::now(&e)),
        );
        Ok(())
    }

    // ========================================================================
    // Sales and rentals
    // ========================================================================

    /// Buy a listed property.
    ///
    /// `amount` is the buyer's offer and must cover the sale price; exactly
    /// the price is pulled from the buyer's token balance, so any excess
    /// never leaves the buyer. The seller is credited the price minus
    /// commission and the admin the commission, both as pending withdrawals.
    /// Ownership moves and the listing resets to `None` in the same call.
    pub fn buy_property(
        e: Env,
        buyer: Address,
        property_id: u64,
        amount: i128,
    ) -> Result<(), Error> {
        lock_reentrancy(&e)?;
        let result = Self::do_buy(&e, &buyer, property_id, amount);
        unlock_reentrancy(&e);
        result
    }

    fn do_buy(e: &Env, buyer: &Address, property_id: u64, amount: i128) -> Result<(), Error> {
        buyer.require_auth();
        require_not_paused(e)?;

        let mut property = read_property(e, property_id)?;
        if property.status != PropertyStatus::ForSale {
            return Err(Error::NotForSale);
        }
        if property.owner == *buyer {
            return Err(Error::InvalidArgument);
        }
        let price = property.price;
        if amount < price {
            return Err(Error::InsufficientFunds);
        }

        let commission = SafeMath::basis_points(price, read_commission_rate(e))
            .ok_or(Error::ArithmeticOverflow)?;
        let seller_net = SafeMath::sub(price, commission).ok_or(Error::ArithmeticOverflow)?;
        let seller = property.owner.clone();
        let admin = read_admin(e)?;

        credit_balance(e, &seller, seller_net)?;
        credit_balance(e, &admin, commission)?;
        remove_from_owner_properties(e, &seller, property_id);
        add_to_owner_properties(e, buyer, property_id);
        property.owner = buyer.clone();
        property.status = PropertyStatus::None;
        write_property(e, &property);

        let payment_token = read_payment_token(e)?;
        token::Client::new(e, &payment_token).transfer(
            buyer,
            &e.current_contract_address(),
            &price,
        );

        e.events().publish(
            (Symbol::new(e, "PropertySold"), property_id),
            (seller, buyer.clone(), price, TimeUtils::now(e)),
        );
        Ok(())
    }

    /// Rent an available property for `duration_days` days.
    ///
    /// The required total is `rent_price * duration_days`; exactly that total
    /// is pulled from the tenant, split between owner and admin like a sale.
    /// The property stays listed for rent but cannot be rented again until
    /// the tenancy ends.
    pub fn rent_property(
        e: Env,
        tenant: Address,
        property_id: u64,
        duration_days: u32,
        amount: i128,
    ) -> Result<(), Error> {
        lock_reentrancy(&e)?;
        let result = Self::do_rent(&e, &tenant, property_id, duration_days, amount);
        unlock_reentrancy(&e);
        result
    }

    fn do_rent(
        e: &Env,
        tenant: &Address,
        property_id: u64,
        duration_days: u32,
        amount: i128,
    ) -> Result<(), Error> {
        tenant.require_auth();
        require_not_paused(e)?;

        let mut property = read_property(e, property_id)?;
        if property.status != PropertyStatus::ForRent || property.current_tenant.is_some() {
            return Err(Error::NotForRent);
        }
        if verification_gate(e) && !property.is_verified {
            return Err(Error::NotVerified);
        }
        if duration_days == 0 || property.owner == *tenant {
            return Err(Error::InvalidArgument);
        }

        let total = SafeMath::mul(property.rent_price, duration_days as i128)
            .ok_or(Error::ArithmeticOverflow)?;
        if amount < total {
            return Err(Error::InsufficientFunds);
        }
        let rental_end =
            TimeUtils::checked_expiration(e, duration_days).ok_or(Error::ArithmeticOverflow)?;

        let commission = SafeMath::basis_points(total, read_commission_rate(e))
            .ok_or(Error::ArithmeticOverflow)?;
        let owner_net = SafeMath::sub(total, commission).ok_or(Error::ArithmeticOverflow)?;
        let owner = property.owner.clone();
        let admin = read_admin(e)?;

        credit_balance(e, &owner, owner_net)?;
        credit_balance(e, &admin, commission)?;
        property.current_tenant = Some(tenant.clone());
        property.rental_end = rental_end;
        write_property(e, &property);

        let payment_token = read_payment_token(e)?;
        token::Client::new(e, &payment_token).transfer(
            tenant,
            &e.current_contract_address(),
            &total,
        );

        e.events().publish(
            (Symbol::new(e, "PropertyRented"), property_id),
            (tenant.clone(), total, rental_end, TimeUtils::now(e)),
        );
        Ok(())
    }

    /// End an active rental.
    ///
    /// The owner may force-end at any time; the tenant only once the rental
    /// period has elapsed. Expiry is observed lazily here, there is no
    /// scheduler. The property returns to the rentable pool, not to `None`.
    pub fn end_rental(e: Env, caller: Address, property_id: u64) -> Result<(), Error> {
        caller.require_auth();

        let mut property = read_property(&e, property_id)?;
        let tenant = property
            .current_tenant
            .clone()
            .ok_or(Error::NoActiveRental)?;
        if caller != property.owner {
            if caller != tenant {
                return Err(Error::Unauthorized);
            }
            if TimeUtils::now(&e) < property.rental_end {
                return Err(Error::RentalNotExpired);
            }
        }

        property.current_tenant = None;
        property.rental_end = 0;
        write_property(&e, &property);

        e.events().publish(
            (Symbol::new(&e, "RentalEnded"), property_id),
            (tenant, TimeUtils::now(&e)),
        );
        Ok(())
    }

    /// Direct gift transfer by the owner, bypassing sale logic and payment.
    ///
    /// The listing resets to `None`; an active tenancy, if any, survives the
    /// transfer and the new owner inherits the force-end right.
    pub fn transfer_property(
        e: Env,
        from: Address,
        to: Address,
        property_id: u64,
    ) -> Result<(), Error> {
        from.require_auth();
        require_not_paused(&e)?;

        let mut property = read_property(&e, property_id)?;
        if property.owner != from {
            return Err(Error::Unauthorized);
        }
        if from == to {
            return Err(Error::InvalidArgument);
        }

        remove_from_owner_properties(&e, &from, property_id);
        add_to_owner_properties(&e, &to, property_id);
        property.owner = to.clone();
        property.status = PropertyStatus::None;
        write_property(&e, &property);

        e.events().publish(
            (Symbol::new(&e, "PropertyTransferred"), property_id),
            (from, to, TimeUtils::now(&e)),
        );
        Ok(())
    }

    // ========================================================================
    // Reviews and likes
    // ========================================================================

    /// Add a review to a property. Anyone but the owner may review.
    pub fn add_review(
        e: Env,
        reviewer: Address,
        property_id: u64,
        content: String,
        rating: u32,
    ) -> Result<u64, Error> {
        reviewer.require_auth();

        let mut property = read_property(&e, property_id)?;
        if !Validation::is_valid_rating(rating) {
            return Err(Error::InvalidRating);
        }
        if property.owner == reviewer {
            return Err(Error::SelfReview);
        }

        let review_id = alloc_review_id(&e);
        let review = Review {
            id: review_id,
            property_id,
            reviewer: reviewer.clone(),
            content,
            rating,
            created_at: TimeUtils::now(&e),
        };
        e.storage()
            .persistent()
            .set(&DataKey::Review(review_id), &review);
        property.review_ids.push_back(review_id);
        write_property(&e, &property);

        e.events().publish(
            (Symbol::new(&e, "ReviewAdded"), property_id, review_id),
            (reviewer, rating, TimeUtils::now(&e)),
        );
        Ok(review_id)
    }

    /// Delete a review. Caller must be its author or hold Admin.
    ///
    /// The record is removed outright; a later lookup fails with `NotFound`.
    pub fn delete_review(e: Env, caller: Address, review_id: u64) -> Result<(), Error> {
        caller.require_auth();

        let review = read_review(&e, review_id)?;
        if review.reviewer != caller && !is_admin(&e, &caller)? {
            return Err(Error::Unauthorized);
        }

        let mut property = read_property(&e, review.property_id)?;
        if let Some(idx) = property.review_ids.iter().position(|id| id == review_id) {
            property.review_ids.remove(idx as u32);
            write_property(&e, &property);
        }
        e.storage().persistent().remove(&DataKey::Review(review_id));

        e.events().publish(
            (
                Symbol::new(&e, "ReviewDeleted"),
                review.property_id,
                review_id,
            ),
            (caller, TimeUtils::now(&e)),
        );
        Ok(())
    }

    /// Toggle the caller's like on a property; returns the new state.
    pub fn toggle_like(e: Env, caller: Address, property_id: u64) -> Result<bool, Error> {
        caller.require_auth();

        let mut property = read_property(&e, property_id)?;
        let key = DataKey::Liked(LikeKey {
            property_id,
            account: caller.clone(),
        });
        let liked = e
            .storage()
            .persistent()
            .get::<_, bool>(&key)
            .unwrap_or(false);
        let now_liked = !liked;
        if now_liked {
            e.storage().persistent().set(&key, &true);
            property.like_count += 1;
        } else {
            e.storage().persistent().remove(&key);
            property.like_count = property.like_count.saturating_sub(1);
        }
        write_property(&e, &property);

        e.events().publish(
            (Symbol::new(&e, "PropertyLiked"), property_id),
            (caller, now_liked, TimeUtils::now(&e)),
        );
        Ok(now_liked)
    }

    // ========================================================================
    // Roles and the minting workflow
    // ========================================================================

    /// Record a request for the minting capability, overwriting any prior
    /// request by the same caller. `document_url` is an opaque reference to
    /// supporting documents; the contract never interprets it.
    pub fn request_mint_role(e: Env, caller: Address, document_url: String) -> Result<(), Error> {
        caller.require_auth();

        let request = MintRequest {
            requester: caller.clone(),
            document_url: document_url.clone(),
            approved: false,
        };
        e.storage()
            .persistent()
            .set(&DataKey::MintRequest(caller.clone()), &request);

        e.events().publish(
            (Symbol::new(&e, "MintRoleRequested"), caller),
            (document_url, TimeUtils::now(&e)),
        );
        Ok(())
    }

    /// Approve or reject a pending mint-role request. Admin only. Approval
    /// grants the Minter capability; rejection records the decision without
    /// granting.
    pub fn approve_mint_role(
        e: Env,
        caller: Address,
        account: Address,
        approved: bool,
    ) -> Result<(), Error> {
        caller.require_auth();
        require_role(&e, &caller, Role::Admin)?;

        let mut request = e
            .storage()
            .persistent()
            .get::<_, MintRequest>(&DataKey::MintRequest(account.clone()))
            .ok_or(Error::NotFound)?;
        request.approved = approved;
        e.storage()
            .persistent()
            .set(&DataKey::MintRequest(account.clone()), &request);
        if approved {
            set_role_grant(&e, Role::Minter, &account, true);
        }

        e.events().publish(
            (Symbol::new(&e, "MintRoleApproved"), account),
            (approved, TimeUtils::now(&e)),
        );
        Ok(())
    }

    /// Grant a role directly, bypassing the request workflow. Admin only.
    pub fn assign_role(e: Env, caller: Address, role: Role, account: Address) -> Result<(), Error> {
        caller.require_auth();
        require_role(&e, &caller, Role::Admin)?;
        set_role_grant(&e, role, &account, true);
        e.events().publish(
            (Symbol::new(&e, "RoleAssigned"),),
            (role, account, caller, TimeUtils::now(&e)),
        );
        Ok(())
    }

    /// Revoke a role grant. Admin only.
    pub fn revoke_role(e: Env, caller: Address, role: Role, account: Address) -> Result<(), Error> {
        caller.require_auth();
        require_role(&e, &caller, Role::Admin)?;
        set_role_grant(&e, role, &account, false);
        e.events().publish(
            (Symbol::new(&e, "RoleRevoked"),),
            (role, account, caller, TimeUtils::now(&e)),
        );
        Ok(())
    }

    // ========================================================================
    // Commission and withdrawals
    // ========================================================================

    /// Set the commission rate in basis points. Admin only. Applies to
    /// subsequent sales and rentals; already-credited balances are untouched.
    pub fn set_commission_rate(e: Env, caller: Address, rate_bps: u32) -> Result<(), Error> {
        caller.require_auth();
        require_role(&e, &caller, Role::Admin)?;
        if !Validation::is_valid_commission_rate(rate_bps) {
            return Err(Error::RateOutOfRange);
        }
        e.storage().instance().set(&DataKey::CommissionRate, &rate_bps);
        e.events().publish(
            (Symbol::new(&e, "CommissionRateChanged"),),
            (rate_bps, TimeUtils::now(&e)),
        );
        Ok(())
    }

    /// Pull the caller's entire pending balance.
    ///
    /// The balance is zeroed before the outbound transfer
    /// (checks-effects-interactions), so a reentrant call observes zero.
    /// Deliberately not gated by the pause switch: owed funds must always be
    /// claimable.
    pub fn withdraw(e: Env, caller: Address) -> Result<i128, Error> {
        lock_reentrancy(&e)?;
        let result = Self::do_withdraw(&e, &caller);
        unlock_reentrancy(&e);
        result
    }

    fn do_withdraw(e: &Env, caller: &Address) -> Result<i128, Error> {
        caller.require_auth();

        let balance = read_balance(e, caller);
        if balance <= 0 {
            return Err(Error::NoBalance);
        }
        write_balance(e, caller, 0);

        let payment_token = read_payment_token(e)?;
        token::Client::new(e, &payment_token).transfer(
            &e.current_contract_address(),
            caller,
            &balance,
        );

        e.events().publish(
            (Symbol::new(e, "Withdrawal"), caller.clone()),
            (balance, TimeUtils::now(e)),
        );
        Ok(balance)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Get a property record by id.
    pub fn get_property_info(e: Env, property_id: u64) -> Result<Property, Error> {
        read_property(&e, property_id)
    }

    /// Ids of all properties owned by `owner`, in acquisition order.
    pub fn get_properties_for_address(e: Env, owner: Address) -> Vec<u64> {
        owner_properties(&e, &owner)
    }

    /// Ids of all properties currently listed for sale.
    pub fn get_properties_for_sale(e: Env) -> Vec<u64> {
        let mut ids = Vec::new(&e);
        for property_id in 0..property_count(&e) {
            if let Some(property) = e
                .storage()
                .persistent()
                .get::<_, Property>(&DataKey::Property(property_id))
            {
                if property.status == PropertyStatus::ForSale {
                    ids.push_back(property_id);
                }
            }
        }
        ids
    }

    /// Ids of all properties rentable right now (listed for rent and not
    /// currently tenanted).
    pub fn get_properties_for_rent(e: Env) -> Vec<u64> {
        let mut ids = Vec::new(&e);
        for property_id in 0..property_count(&e) {
            if let Some(property) = e
                .storage()
                .persistent()
                .get::<_, Property>(&DataKey::Property(property_id))
            {
                if property.status == PropertyStatus::ForRent
                    && property.current_tenant.is_none()
                {
                    ids.push_back(property_id);
                }
            }
        }
        ids
    }

    /// Paginated id listing: at most `limit` ids starting at `offset`,
    /// clamped to the allocated range. Out-of-range offsets yield an empty
    /// vector, never an error.
    pub fn get_all_properties(e: Env, offset: u64, limit: u32) -> Vec<u64> {
        let total = property_count(&e);
        let start = offset.min(total);
        let end = offset.saturating_add(limit as u64).min(total);
        let mut ids = Vec::new(&e);
        for property_id in start..end {
            ids.push_back(property_id);
        }
        ids
    }

    /// Review ids attached to a property, oldest first.
    pub fn get_property_review_ids(e: Env, property_id: u64) -> Result<Vec<u64>, Error> {
        Ok(read_property(&e, property_id)?.review_ids)
    }

    /// Get a review record by id.
    pub fn get_review_details(e: Env, review_id: u64) -> Result<Review, Error> {
        read_review(&e, review_id)
    }

    /// Current commission rate in basis points.
    pub fn commission_rate(e: Env) -> u32 {
        read_commission_rate(&e)
    }

    /// Pending withdrawal balance for an account.
    pub fn user_balance(e: Env, account: Address) -> i128 {
        read_balance(&e, &account)
    }

    /// Total number of properties ever minted.
    pub fn total_properties(e: Env) -> u64 {
        property_count(&e)
    }

    /// Get the admin address.
    pub fn get_admin(e: Env) -> Result<Address, Error> {
        read_admin(&e)
    }

    /// Get the payment token address.
    pub fn payment_token(e: Env) -> Result<Address, Error> {
        read_payment_token(&e)
    }

    /// Whether `account` holds an explicit grant of `role`.
    pub fn has_role(e: Env, account: Address, role: Role) -> bool {
        role_granted(&e, role, &account)
    }

    /// The stored mint-role request for `account`, if any.
    pub fn get_mint_request(e: Env, account: Address) -> Option<MintRequest> {
        e.storage()
            .persistent()
            .get::<_, MintRequest>(&DataKey::MintRequest(account))
    }

    /// Whether listing/detail changes and rentals require verification.
    pub fn verification_required(e: Env) -> bool {
        verification_gate(&e)
    }
}
