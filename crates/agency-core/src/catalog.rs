//! # Collection Catalog
//!
//! One static [`EntitySchema`] per collection. The API mounts generic CRUD
//! routes for every entry of [`catalog`]; module-specific routes look their
//! schema up by name.

use crate::schema::{Alias, Choice, DefaultValue, DeletePolicy, EntitySchema, FieldFormat};

const AGENT_ID: Alias = Alias {
    canonical: "agentId",
    alternates: &["agent_id", "agent"],
};
const PACKAGE_ID: Alias = Alias {
    canonical: "packageId",
    alternates: &["package_id"],
};
const VENDOR_ID: Alias = Alias {
    canonical: "vendorId",
    alternates: &["vendor_id", "vendor"],
};
const CUSTOMER_ID: Alias = Alias {
    canonical: "customerId",
    alternates: &["customer_id"],
};
const CONTACT_NO: Alias = Alias {
    canonical: "contactNo",
    alternates: &["contact_no", "phone", "mobile"],
};
const TRADE_NAME: Alias = Alias {
    canonical: "tradeName",
    alternates: &["trade_name"],
};
const OWNER_NAME: Alias = Alias {
    canonical: "ownerName",
    alternates: &["owner_name"],
};
const PASSPORT_NUMBER: Alias = Alias {
    canonical: "passportNumber",
    alternates: &["passport_number", "passportNo"],
};
const PAID_AMOUNT: Alias = Alias {
    canonical: "paidAmount",
    alternates: &["paid_amount"],
};
const APPLICANT_NAME: Alias = Alias {
    canonical: "applicantName",
    alternates: &["applicant_name"],
};

/// Agent summary fields written by the package rollup.
pub const AGENT_ROLLUP_FIELDS: &[&str] = &[
    "hajjBill",
    "hajjPaid",
    "hajjDue",
    "umrahBill",
    "umrahPaid",
    "umrahDue",
    "totalBill",
    "totalPaid",
    "totalDue",
    "totalHajjPackages",
    "totalUmrahPackages",
    "totalPackages",
    "summaryUpdatedAt",
];

const STATUS_ACTIVE: (&str, DefaultValue) = ("status", DefaultValue::Str("active"));

/// `/api/agents`
pub static AGENTS: EntitySchema = EntitySchema {
    name: "agents",
    path: "agents",
    label: "agent",
    required: &["tradeName", "ownerName", "contactNo"],
    aliases: &[TRADE_NAME, OWNER_NAME, CONTACT_NO],
    numeric: &[],
    enums: &[],
    formats: &[],
    unique: &["tradeName"],
    defaults: &[
        STATUS_ACTIVE,
        ("hajjBill", DefaultValue::Int(0)),
        ("hajjPaid", DefaultValue::Int(0)),
        ("hajjDue", DefaultValue::Int(0)),
        ("umrahBill", DefaultValue::Int(0)),
        ("umrahPaid", DefaultValue::Int(0)),
        ("umrahDue", DefaultValue::Int(0)),
        ("totalBill", DefaultValue::Int(0)),
        ("totalPaid", DefaultValue::Int(0)),
        ("totalDue", DefaultValue::Int(0)),
        ("totalHajjPackages", DefaultValue::Int(0)),
        ("totalUmrahPackages", DefaultValue::Int(0)),
        ("totalPackages", DefaultValue::Int(0)),
    ],
    search_fields: &["tradeName", "ownerName", "contactNo", "tradeLocation", "email"],
    filters: &["tradeLocation"],
    read_only: AGENT_ROLLUP_FIELDS,
    delete: DeletePolicy::Soft,
};

/// `/api/packages`
pub static PACKAGES: EntitySchema = EntitySchema {
    name: "packages",
    path: "packages",
    label: "package",
    required: &["packageName", "packageType"],
    aliases: &[
        AGENT_ID,
        Alias {
            canonical: "packageName",
            alternates: &["package_name"],
        },
        Alias {
            canonical: "packageType",
            alternates: &["package_type", "type"],
        },
        Alias {
            canonical: "totalPrice",
            alternates: &["total_price"],
        },
        PAID_AMOUNT,
        Alias {
            canonical: "assignedCustomers",
            alternates: &["assigned_customers"],
        },
    ],
    numeric: &["totalPrice", "paidAmount", "packageYear"],
    enums: &[],
    formats: &[],
    unique: &[],
    defaults: &[
        STATUS_ACTIVE,
        ("costs", DefaultValue::EmptyObject),
        ("assignedCustomers", DefaultValue::EmptyArray),
        ("totalPrice", DefaultValue::Int(0)),
        ("paidAmount", DefaultValue::Int(0)),
        ("totalCost", DefaultValue::Int(0)),
        ("dueAmount", DefaultValue::Int(0)),
        ("profit", DefaultValue::Int(0)),
    ],
    search_fields: &["packageName", "packageType", "description"],
    filters: &["agentId", "packageType", "packageYear"],
    read_only: &["totalCost", "dueAmount", "profit"],
    delete: DeletePolicy::Hard,
};

const PILGRIM_ALIASES: &[Alias] = &[AGENT_ID, PACKAGE_ID, PASSPORT_NUMBER, PAID_AMOUNT];
const PILGRIM_SEARCH: &[&str] = &["name", "mobile", "passportNumber", "nidNumber", "email"];

/// `/api/hajis`
pub static HAJIS: EntitySchema = EntitySchema {
    name: "hajis",
    path: "hajis",
    label: "haji",
    required: &["name", "mobile"],
    aliases: PILGRIM_ALIASES,
    numeric: &["totalAmount", "paidAmount"],
    enums: &[],
    formats: &[("dateOfBirth", FieldFormat::Date)],
    unique: &[],
    defaults: &[STATUS_ACTIVE],
    search_fields: PILGRIM_SEARCH,
    filters: &["agentId", "packageId"],
    read_only: &[],
    delete: DeletePolicy::Soft,
};

/// `/api/umrahs`
pub static UMRAHS: EntitySchema = EntitySchema {
    name: "umrahs",
    path: "umrahs",
    label: "umrah",
    required: &["name", "mobile"],
    aliases: PILGRIM_ALIASES,
    numeric: &["totalAmount", "paidAmount"],
    enums: &[],
    formats: &[("dateOfBirth", FieldFormat::Date)],
    unique: &[],
    defaults: &[STATUS_ACTIVE],
    search_fields: PILGRIM_SEARCH,
    filters: &["agentId", "packageId"],
    read_only: &[],
    delete: DeletePolicy::Soft,
};

/// `/api/air-customers`
pub static AIR_CUSTOMERS: EntitySchema = EntitySchema {
    name: "air_customers",
    path: "air-customers",
    label: "air customer",
    required: &["name", "mobile"],
    aliases: &[PASSPORT_NUMBER],
    numeric: &[],
    enums: &[],
    formats: &[],
    unique: &[],
    defaults: &[STATUS_ACTIVE],
    search_fields: &["name", "mobile", "email", "passportNumber"],
    filters: &["customerType"],
    read_only: &[],
    delete: DeletePolicy::Soft,
};

/// `/api/air-tickets`
pub static AIR_TICKETS: EntitySchema = EntitySchema {
    name: "air_tickets",
    path: "air-tickets",
    label: "air ticket",
    required: &["passengerName", "airline"],
    aliases: &[
        CUSTOMER_ID,
        Alias {
            canonical: "passengerName",
            alternates: &["passenger_name"],
        },
        Alias {
            canonical: "ticketNumber",
            alternates: &["ticket_number", "ticketNo"],
        },
        PAID_AMOUNT,
    ],
    numeric: &["fare", "paidAmount"],
    enums: &[Choice {
        field: "tripType",
        allowed: &["oneway", "round", "multicity"],
    }],
    formats: &[("flightDate", FieldFormat::Date)],
    unique: &[],
    defaults: &[STATUS_ACTIVE, ("dueAmount", DefaultValue::Int(0))],
    search_fields: &["passengerName", "pnr", "ticketNumber", "airline", "route"],
    filters: &["airline", "customerId", "tripType"],
    read_only: &["dueAmount"],
    delete: DeletePolicy::Hard,
};

/// `/api/vendors`
pub static VENDORS: EntitySchema = EntitySchema {
    name: "vendors",
    path: "vendors",
    label: "vendor",
    required: &["tradeName", "ownerName", "contactNo"],
    aliases: &[TRADE_NAME, OWNER_NAME, CONTACT_NO],
    numeric: &[],
    enums: &[],
    formats: &[],
    unique: &["tradeName"],
    defaults: &[STATUS_ACTIVE, ("bankAccounts", DefaultValue::EmptyArray)],
    search_fields: &["tradeName", "ownerName", "contactNo", "tradeLocation", "vendorType"],
    filters: &["vendorType", "tradeLocation"],
    read_only: &["bankAccounts"],
    delete: DeletePolicy::Soft,
};

/// `/api/vendor-bills`
pub static VENDOR_BILLS: EntitySchema = EntitySchema {
    name: "vendor_bills",
    path: "vendor-bills",
    label: "vendor bill",
    required: &["vendorId", "billType", "amount"],
    aliases: &[
        VENDOR_ID,
        Alias {
            canonical: "billType",
            alternates: &["bill_type"],
        },
        Alias {
            canonical: "billNumber",
            alternates: &["bill_number", "billNo"],
        },
        PAID_AMOUNT,
    ],
    numeric: &["amount", "paidAmount"],
    enums: &[],
    formats: &[("billDate", FieldFormat::Date)],
    unique: &[],
    defaults: &[
        STATUS_ACTIVE,
        ("paidAmount", DefaultValue::Int(0)),
        ("dueAmount", DefaultValue::Int(0)),
    ],
    search_fields: &["billType", "billNumber", "description"],
    filters: &["vendorId", "billType"],
    read_only: &["dueAmount"],
    delete: DeletePolicy::Hard,
};

/// `/api/hotels`
pub static HOTELS: EntitySchema = EntitySchema {
    name: "hotels",
    path: "hotels",
    label: "hotel",
    required: &["name", "city"],
    aliases: &[],
    numeric: &["pricePerNight", "distanceFromHaram", "starRating"],
    enums: &[],
    formats: &[],
    unique: &[],
    defaults: &[STATUS_ACTIVE],
    search_fields: &["name", "city", "country", "address"],
    filters: &["city", "country"],
    read_only: &[],
    delete: DeletePolicy::Hard,
};

/// `/api/licenses`
pub static LICENSES: EntitySchema = EntitySchema {
    name: "licenses",
    path: "licenses",
    label: "license",
    required: &["licenseNumber", "holderName", "expiryDate"],
    aliases: &[
        Alias {
            canonical: "licenseNumber",
            alternates: &["license_number", "licenseNo"],
        },
        Alias {
            canonical: "holderName",
            alternates: &["holder_name"],
        },
        Alias {
            canonical: "expiryDate",
            alternates: &["expiry_date"],
        },
        Alias {
            canonical: "issueDate",
            alternates: &["issue_date"],
        },
    ],
    numeric: &[],
    enums: &[],
    formats: &[("expiryDate", FieldFormat::Date), ("issueDate", FieldFormat::Date)],
    unique: &["licenseNumber"],
    defaults: &[STATUS_ACTIVE],
    search_fields: &["licenseNumber", "holderName", "licenseType", "issuingAuthority"],
    filters: &["licenseType"],
    read_only: &[],
    delete: DeletePolicy::Hard,
};

/// `/api/airports`
pub static AIRPORTS: EntitySchema = EntitySchema {
    name: "airports",
    path: "airports",
    label: "airport",
    required: &["iataCode", "name"],
    aliases: &[Alias {
        canonical: "iataCode",
        alternates: &["iata_code", "iata"],
    }],
    numeric: &[],
    enums: &[],
    formats: &[("iataCode", FieldFormat::IataCode)],
    unique: &["iataCode"],
    defaults: &[STATUS_ACTIVE],
    search_fields: &["iataCode", "name", "city", "country"],
    filters: &["country"],
    read_only: &[],
    delete: DeletePolicy::Hard,
};

/// `/api/branches`
pub static BRANCHES: EntitySchema = EntitySchema {
    name: "branches",
    path: "branches",
    label: "branch",
    required: &["branchName"],
    aliases: &[
        Alias {
            canonical: "branchName",
            alternates: &["branch_name"],
        },
        Alias {
            canonical: "branchCode",
            alternates: &["branch_code"],
        },
    ],
    numeric: &[],
    enums: &[],
    formats: &[],
    unique: &["branchName"],
    defaults: &[STATUS_ACTIVE],
    search_fields: &["branchName", "branchCode", "address", "managerName"],
    filters: &["branchCode"],
    read_only: &[],
    delete: DeletePolicy::Soft,
};

/// `/api/contacts`
pub static CONTACTS: EntitySchema = EntitySchema {
    name: "contacts",
    path: "contacts",
    label: "contact",
    required: &["name", "phone"],
    aliases: &[],
    numeric: &[],
    enums: &[],
    formats: &[],
    unique: &[],
    defaults: &[],
    search_fields: &["name", "phone", "email", "company"],
    filters: &["category"],
    read_only: &[],
    delete: DeletePolicy::Hard,
};

/// `/api/investments`
pub static INVESTMENTS: EntitySchema = EntitySchema {
    name: "investments",
    path: "investments",
    label: "investment",
    required: &["investmentName", "amount"],
    aliases: &[Alias {
        canonical: "investmentName",
        alternates: &["investment_name"],
    }],
    numeric: &["amount", "returnAmount"],
    enums: &[],
    formats: &[("investmentDate", FieldFormat::Date)],
    unique: &[],
    defaults: &[STATUS_ACTIVE],
    search_fields: &["investmentName", "investmentType", "description"],
    filters: &["investmentType"],
    read_only: &[],
    delete: DeletePolicy::Hard,
};

/// `/api/loans`
pub static LOANS: EntitySchema = EntitySchema {
    name: "loans",
    path: "loans",
    label: "loan",
    required: &["partyName", "loanType", "amount"],
    aliases: &[
        Alias {
            canonical: "partyName",
            alternates: &["party_name"],
        },
        Alias {
            canonical: "loanType",
            alternates: &["loan_type"],
        },
        PAID_AMOUNT,
    ],
    numeric: &["amount", "paidAmount", "interestRate"],
    enums: &[Choice {
        field: "loanType",
        allowed: &["given", "taken"],
    }],
    formats: &[("dueDate", FieldFormat::Date)],
    unique: &[],
    defaults: &[
        STATUS_ACTIVE,
        ("paidAmount", DefaultValue::Int(0)),
        ("dueAmount", DefaultValue::Int(0)),
    ],
    search_fields: &["partyName", "phone", "description"],
    filters: &["loanType"],
    read_only: &["dueAmount"],
    delete: DeletePolicy::Hard,
};

/// `/api/cattle`
pub static CATTLE: EntitySchema = EntitySchema {
    name: "cattle",
    path: "cattle",
    label: "cattle",
    required: &["tagNumber", "breed"],
    aliases: &[Alias {
        canonical: "tagNumber",
        alternates: &["tag_number", "tagNo"],
    }],
    numeric: &["weight", "purchasePrice", "age"],
    enums: &[Choice {
        field: "gender",
        allowed: &["male", "female"],
    }],
    formats: &[("purchaseDate", FieldFormat::Date)],
    unique: &["tagNumber"],
    defaults: &[STATUS_ACTIVE],
    search_fields: &["tagNumber", "breed", "name"],
    filters: &["breed", "gender"],
    read_only: &[],
    delete: DeletePolicy::Hard,
};

/// `/api/farm-records`
pub static FARM_RECORDS: EntitySchema = EntitySchema {
    name: "farm_records",
    path: "farm-records",
    label: "farm record",
    required: &["recordType", "date"],
    aliases: &[
        Alias {
            canonical: "recordType",
            alternates: &["record_type"],
        },
        Alias {
            canonical: "cattleId",
            alternates: &["cattle_id"],
        },
    ],
    numeric: &["amount", "quantity"],
    enums: &[],
    formats: &[("date", FieldFormat::Date)],
    unique: &[],
    defaults: &[],
    search_fields: &["recordType", "description"],
    filters: &["recordType", "cattleId"],
    read_only: &[],
    delete: DeletePolicy::Hard,
};

/// `/api/expense-categories`
pub static EXPENSE_CATEGORIES: EntitySchema = EntitySchema {
    name: "expense_categories",
    path: "expense-categories",
    label: "expense category",
    required: &["name"],
    aliases: &[],
    numeric: &[],
    enums: &[],
    formats: &[],
    unique: &["name"],
    defaults: &[],
    search_fields: &["name", "description"],
    filters: &[],
    read_only: &[],
    delete: DeletePolicy::Hard,
};

/// `/api/expense-profiles`
pub static EXPENSE_PROFILES: EntitySchema = EntitySchema {
    name: "expense_profiles",
    path: "expense-profiles",
    label: "expense profile",
    required: &["name"],
    aliases: &[],
    numeric: &["monthlyBudget"],
    enums: &[],
    formats: &[],
    unique: &[],
    defaults: &[],
    search_fields: &["name", "description"],
    filters: &[],
    read_only: &[],
    delete: DeletePolicy::Hard,
};

/// `/api/personal-expenses`
pub static PERSONAL_EXPENSES: EntitySchema = EntitySchema {
    name: "personal_expenses",
    path: "personal-expenses",
    label: "personal expense",
    required: &["categoryId", "amount", "date"],
    aliases: &[
        Alias {
            canonical: "categoryId",
            alternates: &["category_id"],
        },
        Alias {
            canonical: "profileId",
            alternates: &["profile_id"],
        },
    ],
    numeric: &["amount"],
    enums: &[],
    formats: &[("date", FieldFormat::Date)],
    unique: &[],
    defaults: &[],
    search_fields: &["description", "note", "paymentMethod"],
    filters: &["categoryId", "profileId", "paymentMethod"],
    read_only: &[],
    delete: DeletePolicy::Hard,
};

/// `/api/visa-services`
pub static VISA_SERVICES: EntitySchema = EntitySchema {
    name: "visa_services",
    path: "visa-services",
    label: "visa service",
    required: &["applicantName", "passportNumber", "country"],
    aliases: &[
        APPLICANT_NAME,
        PASSPORT_NUMBER,
        Alias {
            canonical: "visaType",
            alternates: &["visa_type"],
        },
        PAID_AMOUNT,
    ],
    numeric: &["fee", "paidAmount"],
    enums: &[],
    formats: &[],
    unique: &[],
    defaults: &[("status", DefaultValue::Str("pending"))],
    search_fields: &["applicantName", "passportNumber", "country", "visaType"],
    filters: &["country", "visaType"],
    read_only: &[],
    delete: DeletePolicy::Hard,
};

/// `/api/passport-services`
pub static PASSPORT_SERVICES: EntitySchema = EntitySchema {
    name: "passport_services",
    path: "passport-services",
    label: "passport service",
    required: &["applicantName", "serviceType"],
    aliases: &[
        APPLICANT_NAME,
        PASSPORT_NUMBER,
        Alias {
            canonical: "serviceType",
            alternates: &["service_type"],
        },
    ],
    numeric: &["fee", "paidAmount"],
    enums: &[],
    formats: &[("deliveryDate", FieldFormat::Date)],
    unique: &[],
    defaults: &[("status", DefaultValue::Str("pending"))],
    search_fields: &["applicantName", "passportNumber", "serviceType"],
    filters: &["serviceType"],
    read_only: &[],
    delete: DeletePolicy::Hard,
};

/// `/api/exchanges`
pub static EXCHANGES: EntitySchema = EntitySchema {
    name: "exchanges",
    path: "exchanges",
    label: "exchange",
    required: &["currencyCode", "exchangeType", "amount", "rate"],
    aliases: &[
        Alias {
            canonical: "currencyCode",
            alternates: &["currency_code", "currency"],
        },
        Alias {
            canonical: "exchangeType",
            alternates: &["exchange_type", "type"],
        },
    ],
    numeric: &["amount", "rate"],
    enums: &[Choice {
        field: "exchangeType",
        allowed: &["buy", "sell"],
    }],
    formats: &[],
    unique: &[],
    defaults: &[("totalAmount", DefaultValue::Int(0))],
    search_fields: &["currencyCode", "customerName", "reference"],
    filters: &["currencyCode", "exchangeType"],
    read_only: &["totalAmount"],
    delete: DeletePolicy::Hard,
};

/// `/api/transactions`
pub static TRANSACTIONS: EntitySchema = EntitySchema {
    name: "transactions",
    path: "transactions",
    label: "transaction",
    required: &["transactionType", "amount"],
    aliases: &[
        Alias {
            canonical: "transactionType",
            alternates: &["transaction_type", "type"],
        },
        CUSTOMER_ID,
        Alias {
            canonical: "paymentMethod",
            alternates: &["payment_method"],
        },
    ],
    numeric: &["amount"],
    enums: &[Choice {
        field: "transactionType",
        allowed: &["credit", "debit"],
    }],
    formats: &[],
    unique: &[],
    defaults: &[("status", DefaultValue::Str("completed"))],
    search_fields: &["customerName", "description", "reference", "paymentMethod", "transactionType"],
    filters: &["transactionType", "customerId", "paymentMethod"],
    read_only: &[],
    delete: DeletePolicy::Hard,
};

/// `/api/notifications`
pub static NOTIFICATIONS: EntitySchema = EntitySchema {
    name: "notifications",
    path: "notifications",
    label: "notification",
    required: &["title", "message"],
    aliases: &[],
    numeric: &[],
    enums: &[],
    formats: &[],
    unique: &[],
    defaults: &[("isRead", DefaultValue::Bool(false)), ("type", DefaultValue::Str("info"))],
    search_fields: &["title", "message"],
    filters: &["type", "isRead"],
    read_only: &[],
    delete: DeletePolicy::Hard,
};

static CATALOG: [&EntitySchema; 25] = [
    &AGENTS,
    &PACKAGES,
    &HAJIS,
    &UMRAHS,
    &AIR_CUSTOMERS,
    &AIR_TICKETS,
    &VENDORS,
    &VENDOR_BILLS,
    &HOTELS,
    &LICENSES,
    &AIRPORTS,
    &BRANCHES,
    &CONTACTS,
    &INVESTMENTS,
    &LOANS,
    &CATTLE,
    &FARM_RECORDS,
    &EXPENSE_CATEGORIES,
    &EXPENSE_PROFILES,
    &PERSONAL_EXPENSES,
    &VISA_SERVICES,
    &PASSPORT_SERVICES,
    &EXCHANGES,
    &TRANSACTIONS,
    &NOTIFICATIONS,
];

/// Every collection schema.
pub fn catalog() -> &'static [&'static EntitySchema] {
    &CATALOG
}

/// Find a schema by collection name.
pub fn lookup(name: &str) -> Option<&'static EntitySchema> {
    CATALOG.iter().copied().find(|s| s.name == name)
}

/// Find a schema by URL segment.
pub fn lookup_path(path: &str) -> Option<&'static EntitySchema> {
    CATALOG.iter().copied().find(|s| s.path == path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{normalize_input, shape_output};
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn names_and_paths_are_unique() {
        let names: HashSet<_> = catalog().iter().map(|s| s.name).collect();
        let paths: HashSet<_> = catalog().iter().map(|s| s.path).collect();
        assert_eq!(names.len(), catalog().len());
        assert_eq!(paths.len(), catalog().len());
    }

    #[test]
    fn lookup_by_name_and_path() {
        assert_eq!(lookup("air_tickets").map(|s| s.path), Some("air-tickets"));
        assert_eq!(lookup_path("air-tickets").map(|s| s.name), Some("air_tickets"));
        assert!(lookup("users").is_none());
    }

    #[test]
    fn soft_delete_modules() {
        let soft: Vec<_> = catalog()
            .iter()
            .filter(|s| s.soft_delete())
            .map(|s| s.name)
            .collect();
        assert_eq!(
            soft,
            vec!["agents", "hajis", "umrahs", "air_customers", "vendors", "branches"]
        );
    }

    #[test]
    fn every_unique_field_is_required() {
        for schema in catalog() {
            for field in schema.unique {
                assert!(
                    schema.required.contains(field),
                    "{}: unique field {field} is not required",
                    schema.name
                );
            }
        }
    }

    #[test]
    fn no_field_is_both_canonical_and_alias() {
        for schema in catalog() {
            let canonical: HashSet<_> = schema.aliases.iter().map(|a| a.canonical).collect();
            for alias in schema.aliases {
                for alt in alias.alternates {
                    assert!(!canonical.contains(alt), "{}: {alt}", schema.name);
                }
            }
        }
    }

    #[test]
    fn agent_phone_folds_to_contact_no() {
        let doc = normalize_input(
            &AGENTS,
            json!({"trade_name": "Al Noor", "owner_name": "Karim", "phone": "0171"}),
        )
        .unwrap();
        assert_eq!(doc["tradeName"], "Al Noor");
        assert_eq!(doc["ownerName"], "Karim");
        assert_eq!(doc["contactNo"], "0171");
    }

    #[test]
    fn agent_rollup_fields_cannot_be_written_by_clients() {
        let doc = normalize_input(&AGENTS, json!({"tradeName": "x", "hajjBill": 999})).unwrap();
        assert!(!doc.contains_key("hajjBill"));
    }

    #[test]
    fn package_type_alias() {
        let doc = normalize_input(&PACKAGES, json!({"packageName": "p", "type": "Hajj"})).unwrap();
        assert_eq!(doc["packageType"], "Hajj");
    }

    #[test]
    fn new_notification_is_unread() {
        let shaped = shape_output(&NOTIFICATIONS, json!({"_id": "a"}).as_object().unwrap());
        assert_eq!(shaped["isRead"], false);
    }
}
