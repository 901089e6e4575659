//! Membership plan presentation rules.

use civitas_api_types::{MembershipPlan, PlanImage};

use crate::domain::records::sort_for_display;

/// Plans offered publicly: active only, in display order.
pub fn offered_plans(plans: Vec<MembershipPlan>) -> Vec<MembershipPlan> {
    let mut offered: Vec<MembershipPlan> = plans.into_iter().filter(|plan| plan.is_active).collect();
    sort_for_display(&mut offered);
    offered
}

/// The first image is the cover.
pub fn cover_image(plan: &MembershipPlan) -> Option<&PlanImage> {
    plan.images.first()
}

/// Price with billing suffix, e.g. `1,200 / year`. Whole amounts drop decimals.
pub fn format_price(plan: &MembershipPlan) -> String {
    let amount = if plan.price.fract() == 0.0 {
        group_thousands(&format!("{:.0}", plan.price))
    } else {
        let formatted = format!("{:.2}", plan.price);
        match formatted.split_once('.') {
            Some((whole, cents)) => format!("{}.{cents}", group_thousands(whole)),
            None => formatted,
        }
    };
    format!("{amount}{}", plan.billing.price_suffix())
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}

#[cfg(test)]
mod tests {
    use civitas_api_types::Billing;

    use super::*;

    fn plan(id: &str, price: f64, billing: Billing, active: bool, sort_order: i32) -> MembershipPlan {
        MembershipPlan {
            id: id.into(),
            subject: "Membership".into(),
            plan: id.into(),
            title: format!("{id} plan"),
            short: String::new(),
            intro: String::new(),
            price,
            billing,
            features: Vec::new(),
            images: Vec::new(),
            is_active: active,
            sort_order,
        }
    }

    #[test]
    fn only_active_plans_are_offered_in_order() {
        let offered = offered_plans(vec![
            plan("b", 10.0, Billing::Month, true, 2),
            plan("hidden", 0.0, Billing::Month, false, 0),
            plan("a", 10.0, Billing::Month, true, 1),
        ]);
        let ids: Vec<&str> = offered.iter().map(|plan| plan.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn prices_carry_billing_suffix() {
        let yearly = plan("x", 1200.0, Billing::Year, true, 0);
        let once = plan("y", 49.5, Billing::OneTime, true, 0);
        assert_eq!(format_price(&yearly), format!("1,200{}", Billing::Year.price_suffix()));
        assert_eq!(format_price(&once), format!("49.50{}", Billing::OneTime.price_suffix()));
        assert_eq!(group_thousands("1234567"), "1,234,567");
        assert_eq!(group_thousands("999"), "999");
    }
}
