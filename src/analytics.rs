use crate::models::Transaction;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Sales totals for one region
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSales {
    pub region: String,
    pub total_sales: f64,
    pub transaction_count: usize,
    /// Share of the batch total, as a percentage
    pub percentage: f64,
}

/// Quantity and revenue totals for one product
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSales {
    pub product_name: String,
    pub total_quantity: i64,
    pub total_revenue: f64,
}

/// Purchase profile for one customer
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerProfile {
    pub customer_id: String,
    pub total_spent: f64,
    pub purchase_count: usize,
    pub avg_order_value: f64,
    /// Distinct products, sorted by name
    pub products_bought: Vec<String>,
}

/// One day of the sales trend
#[derive(Debug, Clone, PartialEq)]
pub struct DailySales {
    pub date: String,
    pub revenue: f64,
    pub transaction_count: usize,
    pub unique_customers: usize,
}

/// The day with the highest revenue
#[derive(Debug, Clone, PartialEq)]
pub struct PeakDay {
    pub date: String,
    pub revenue: f64,
    pub transaction_count: usize,
}

/// Round a monetary value to two decimals, ties to the nearest even cent.
/// Applied once when a result is built, never while accumulating.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Sum of quantity times unit price over the whole batch, unrounded
pub fn total_revenue(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(Transaction::amount).sum()
}

/// Revenue, transaction count and revenue share per region, sorted by total
/// sales descending. Ties keep first-seen region order. Records with a blank
/// region are skipped.
pub fn region_wise_sales(transactions: &[Transaction]) -> Vec<RegionSales> {
    let overall = total_revenue(transactions);

    let mut order: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<RegionSales> = Vec::new();

    for transaction in transactions {
        let region = transaction.region.trim();
        if region.is_empty() {
            continue;
        }
        let index = match order.get(region) {
            Some(&index) => index,
            None => {
                order.insert(region.to_string(), groups.len());
                groups.push(RegionSales {
                    region: region.to_string(),
                    total_sales: 0.0,
                    transaction_count: 0,
                    percentage: 0.0,
                });
                groups.len() - 1
            }
        };
        groups[index].total_sales += transaction.amount();
        groups[index].transaction_count += 1;
    }

    for group in &mut groups {
        group.percentage = if overall > 0.0 {
            round2(group.total_sales / overall * 100.0)
        } else {
            0.0
        };
        group.total_sales = round2(group.total_sales);
    }

    // Stable sort keeps the insertion order of equal totals
    groups.sort_by(|a, b| b.total_sales.total_cmp(&a.total_sales));
    groups
}

/// Per-product quantity and revenue totals, in first-seen product order
fn product_totals(transactions: &[Transaction]) -> Vec<ProductSales> {
    let mut order: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<ProductSales> = Vec::new();

    for transaction in transactions {
        let name = transaction.product_name.trim();
        if name.is_empty() {
            continue;
        }
        let index = match order.get(name) {
            Some(&index) => index,
            None => {
                order.insert(name.to_string(), groups.len());
                groups.push(ProductSales {
                    product_name: name.to_string(),
                    total_quantity: 0,
                    total_revenue: 0.0,
                });
                groups.len() - 1
            }
        };
        groups[index].total_quantity += transaction.quantity;
        groups[index].total_revenue += transaction.amount();
    }

    for group in &mut groups {
        group.total_revenue = round2(group.total_revenue);
    }
    groups
}

/// The `n` products with the highest total quantity sold, descending.
/// Ties keep first-seen product order; fewer than `n` products yields them all.
pub fn top_selling_products(transactions: &[Transaction], n: usize) -> Vec<ProductSales> {
    let mut products = product_totals(transactions);
    products.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));
    products.truncate(n);
    products
}

/// Products whose total quantity stayed strictly below `threshold`,
/// ascending by quantity
pub fn low_performing_products(transactions: &[Transaction], threshold: i64) -> Vec<ProductSales> {
    let mut products: Vec<ProductSales> = product_totals(transactions)
        .into_iter()
        .filter(|product| product.total_quantity < threshold)
        .collect();
    products.sort_by(|a, b| a.total_quantity.cmp(&b.total_quantity));
    products
}

/// Spend, order count, average order value and distinct products per
/// customer, sorted by total spend descending. Ties keep first-seen order.
pub fn customer_analysis(transactions: &[Transaction]) -> Vec<CustomerProfile> {
    struct CustomerAcc {
        customer_id: String,
        total_spent: f64,
        purchase_count: usize,
        products: BTreeSet<String>,
    }

    let mut order: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<CustomerAcc> = Vec::new();

    for transaction in transactions {
        let customer = transaction.customer_id.trim();
        if customer.is_empty() {
            continue;
        }
        let index = match order.get(customer) {
            Some(&index) => index,
            None => {
                order.insert(customer.to_string(), groups.len());
                groups.push(CustomerAcc {
                    customer_id: customer.to_string(),
                    total_spent: 0.0,
                    purchase_count: 0,
                    products: BTreeSet::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[index];
        group.total_spent += transaction.amount();
        group.purchase_count += 1;
        let product = transaction.product_name.trim();
        if !product.is_empty() {
            group.products.insert(product.to_string());
        }
    }

    let mut profiles: Vec<CustomerProfile> = groups
        .into_iter()
        .map(|acc| CustomerProfile {
            // Average is taken on the raw total before rounding
            avg_order_value: round2(acc.total_spent / acc.purchase_count as f64),
            total_spent: round2(acc.total_spent),
            purchase_count: acc.purchase_count,
            products_bought: acc.products.into_iter().collect(),
            customer_id: acc.customer_id,
        })
        .collect();

    profiles.sort_by(|a, b| b.total_spent.total_cmp(&a.total_spent));
    profiles
}

/// Revenue, transaction count and unique customers per day, ascending by
/// date string (chronological for ISO dates)
pub fn daily_sales_trend(transactions: &[Transaction]) -> Vec<DailySales> {
    struct DayAcc {
        date: String,
        revenue: f64,
        transaction_count: usize,
        customers: HashSet<String>,
    }

    let mut order: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<DayAcc> = Vec::new();

    for transaction in transactions {
        let date = transaction.date.trim();
        if date.is_empty() {
            continue;
        }
        let index = match order.get(date) {
            Some(&index) => index,
            None => {
                order.insert(date.to_string(), groups.len());
                groups.push(DayAcc {
                    date: date.to_string(),
                    revenue: 0.0,
                    transaction_count: 0,
                    customers: HashSet::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[index];
        group.revenue += transaction.amount();
        group.transaction_count += 1;
        let customer = transaction.customer_id.trim();
        if !customer.is_empty() {
            group.customers.insert(customer.to_string());
        }
    }

    let mut days: Vec<DailySales> = groups
        .into_iter()
        .map(|acc| DailySales {
            date: acc.date,
            revenue: round2(acc.revenue),
            transaction_count: acc.transaction_count,
            unique_customers: acc.customers.len(),
        })
        .collect();

    days.sort_by(|a, b| a.date.cmp(&b.date));
    days
}

/// The daily-trend entry with the highest revenue. Ties go to the earliest
/// date; an empty trend yields the "No data" sentinel.
pub fn find_peak_sales_day(transactions: &[Transaction]) -> PeakDay {
    let trend = daily_sales_trend(transactions);

    let mut best: Option<&DailySales> = None;
    for day in &trend {
        let replace = match best {
            Some(current) => day.revenue > current.revenue,
            None => true,
        };
        if replace {
            best = Some(day);
        }
    }

    match best {
        Some(day) => PeakDay {
            date: day.date.clone(),
            revenue: day.revenue,
            transaction_count: day.transaction_count,
        },
        None => PeakDay {
            date: "No data".to_string(),
            revenue: 0.0,
            transaction_count: 0,
        },
    }
}
