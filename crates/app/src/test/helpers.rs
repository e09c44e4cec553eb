//! Test Helpers

use nutbasket::{
    catalog::ProductStatus,
    coupons::{CouponStatus, DiscountType},
};
use rust_decimal::Decimal;

use crate::{
    domain::{
        addresses::{
            AddressesService, AddressesServiceError,
            data::NewAddress,
            records::{AddressRecord, AddressUuid},
        },
        coupons::{data::NewCoupon, records::CouponUuid},
        products::{
            ProductsService, ProductsServiceError,
            data::NewProduct,
            records::{ProductRecord, ProductUuid},
        },
        users::UserUuid,
    },
    test::TestContext,
};

/// An active product with a slug derived from its name.
pub(crate) fn new_product(name: &str, price: Decimal, stock_quantity: u32) -> NewProduct {
    let uuid = ProductUuid::new();

    NewProduct {
        uuid,
        name: name.to_string(),
        slug: format!("{}-{}", name.to_lowercase().replace(' ', "-"), uuid.into_uuid().simple()),
        image: None,
        price,
        compare_price: None,
        stock_quantity,
        low_stock_threshold: 5,
        status: ProductStatus::Active,
    }
}

pub(crate) async fn create_product(
    ctx: &TestContext,
    name: &str,
    price: Decimal,
    stock_quantity: u32,
) -> Result<ProductRecord, ProductsServiceError> {
    ctx.products
        .create_product(new_product(name, price, stock_quantity))
        .await
}

pub(crate) async fn create_inactive_product(
    ctx: &TestContext,
    name: &str,
    price: Decimal,
    stock_quantity: u32,
) -> Result<ProductRecord, ProductsServiceError> {
    ctx.products
        .create_product(NewProduct {
            status: ProductStatus::Inactive,
            ..new_product(name, price, stock_quantity)
        })
        .await
}

/// An active coupon with no dates, limits or minimum.
pub(crate) fn new_coupon(code: &str, discount_type: DiscountType, value: Decimal) -> NewCoupon {
    NewCoupon {
        uuid: CouponUuid::new(),
        code: code.to_string(),
        discount_type,
        discount_value: value,
        max_discount_amount: None,
        min_order_amount: Decimal::ZERO,
        valid_from: None,
        valid_to: None,
        usage_limit: None,
        user_limit: None,
        status: CouponStatus::Active,
    }
}

pub(crate) fn new_address(user: Option<UserUuid>) -> NewAddress {
    NewAddress {
        uuid: AddressUuid::new(),
        user_uuid: user,
        recipient: "Asha Rao".to_string(),
        line1: "12 Market Road".to_string(),
        line2: None,
        city: "Pune".to_string(),
        state: "MH".to_string(),
        postal_code: "411001".to_string(),
        phone: "+91 98000 00000".to_string(),
    }
}

pub(crate) async fn create_address(
    ctx: &TestContext,
    user: Option<UserUuid>,
) -> Result<AddressRecord, AddressesServiceError> {
    ctx.addresses.create_address(new_address(user)).await
}
