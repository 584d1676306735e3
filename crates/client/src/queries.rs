//! GraphQL documents sent to the patient API.

/// Append `PatientFragment` to an operation that spreads it.
macro_rules! with_fragment {
    ($op:literal) => {
        concat!(
            $op,
            r#"
fragment PatientFragment on Patient {
  id
  firstName
  lastName
  email
  phone
  dateOfBirth
  gender
  medicalRecordNumber
  status
  address { street city state zipCode country }
  emergencyContact { name relationship phone email }
  insurance { provider policyNumber groupNumber }
  createdAt
  updatedAt
}
"#
        )
    };
}

pub const GET_PATIENTS: &str = with_fragment!(
    r#"
query GetPatients(
  $first: Int
  $after: String
  $search: String
  $status: PatientStatus
  $gender: Gender
  $ageRange: AgeRangeInput
) {
  patients(
    first: $first
    after: $after
    search: $search
    status: $status
    gender: $gender
    ageRange: $ageRange
  ) {
    edges { node { ...PatientFragment } cursor }
    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
    totalCount
  }
}
"#
);

pub const CREATE_PATIENT: &str = with_fragment!(
    r#"
mutation CreatePatient($input: CreatePatientInput!) {
  createPatient(input: $input) { ...PatientFragment }
}
"#
);

pub const UPDATE_PATIENT: &str = with_fragment!(
    r#"
mutation UpdatePatient($id: ID!, $input: UpdatePatientInput!) {
  updatePatient(id: $id, input: $input) { ...PatientFragment }
}
"#
);

pub const DELETE_PATIENT: &str = r#"
mutation DeletePatient($id: ID!) {
  deletePatient(id: $id) { success message }
}
"#;
