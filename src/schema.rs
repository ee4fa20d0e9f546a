table! {
    treatments (name) {
        name -> Text,
        slots -> Array<Text>,
        price -> Float8,
    }
}

table! {
    bookings (id) {
        id -> Uuid,
        treatment_name -> Text,
        date -> Text,
        slot -> Text,
        patient_email -> Text,
        patient_name -> Text,
        paid -> Bool,
        transaction_id -> Nullable<Text>,
    }
}

table! {
    payments (id) {
        id -> Uuid,
        booking_id -> Uuid,
        transaction_id -> Text,
        created_at -> Timestamptz,
    }
}

table! {
    users (email) {
        email -> Text,
        name -> Nullable<Text>,
        role -> Nullable<Text>,
    }
}

table! {
    doctors (email) {
        email -> Text,
        name -> Text,
        specialty -> Text,
    }
}

joinable!(payments -> bookings (booking_id));

allow_tables_to_appear_in_same_query!(treatments, bookings, payments, users, doctors);
