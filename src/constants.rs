// -
// REST endpoints, relative to `ApiConfig::base_url`; the `/votes` family is
// relative to `ApiConfig::votes_base_url`

pub(crate) const VOTING_PATH: &str = "/voting";
pub(crate) const CANDIDATE_PATH: &str = "/candidate";
pub(crate) const ADD_CANDIDATE_PATH: &str = "/add-candidates";
pub(crate) const VISIONS_PATH: &str = "/visions";
pub(crate) const MISSIONS_PATH: &str = "/missions";
pub(crate) const ALL_VOTERS_PATH: &str = "/all-voters";
pub(crate) const ADD_VOTER_PATH: &str = "/add-voter";
pub(crate) const VOTES_PATH: &str = "/votes";
pub(crate) const ALL_VOTES_PATH: &str = "/votes/get-all";
pub(crate) const LOGIN_PATH: &str = "/login";
pub(crate) const CHANGE_PASSWORD_PATH: &str = "/change-password";
pub(crate) const RESET_PEMIRA_PATH: &str = "/reset-pemira";

// -
// User-facing messages

pub const MSG_ALREADY_VOTED: &str = "Anda sudah melakukan voting sebelumnya.";
pub const MSG_VOTE_FAILED: &str = "Terjadi kesalahan saat memproses suara Anda.";
pub const MSG_VOTE_SUCCESS: &str = "Terima Kasih Atas Partisipasi Anda!";
pub const MSG_CANDIDATES_FAILED: &str = "Gagal memuat data kandidat";
pub const MSG_IDENTITY_FAILED: &str = "Gagal menyimpan data identitas, silakan coba lagi";

pub const MSG_STATUS_FETCH_FAILED: &str = "Gagal memuat status voting";
pub const MSG_STATUS_UPDATE_FAILED: &str = "Gagal mengupdate status voting";
pub const MSG_RESET_FAILED: &str = "Gagal mereset Pemira";
pub const MSG_RESET_CONFIRM: &str =
    "Apakah Anda yakin akan mereset Pemira? Seluruh data Pemira akan dihapus.";

pub const MSG_LOGIN_EMPTY: &str = "Username atau password tidak boleh kosong";
pub const MSG_LOGIN_MISMATCH: &str = "Username atau password tidak sesuai";
pub const MSG_LOGIN_UNKNOWN_USER: &str = "Username tidak ditemukan";
pub const MSG_LOGIN_SYSTEM: &str = "Terjadi gangguan sistem, silakan coba beberapa saat lagi";

pub const MSG_PASSWORD_MISMATCH: &str = "Password baru tidak cocok";
pub const MSG_PASSWORD_NO_USER: &str = "User tidak ditemukan. Silakan login terlebih dahulu.";
pub const MSG_PASSWORD_CHANGED: &str = "Ganti password berhasil";
pub const MSG_PASSWORD_SERVER: &str = "Terjadi kesalahan pada server";

pub const MSG_DASHBOARD_FAILED: &str = "Gagal memuat data";
pub const MSG_VOTERS_FAILED: &str = "Failed to fetch voters";
pub const MSG_ADD_CANDIDATE_FAILED: &str = "Failed to add candidate";
pub const MSG_DELETE_CANDIDATE_FAILED: &str = "Failed to delete candidate";
pub const MSG_DELETE_CANDIDATE_CONFIRM: &str = "Apakah Anda yakin ingin menghapus kandidat ini?";

// -
// Voter roll export

pub const VOTER_CSV_HEADER: [&str; 4] = ["Nama", "NIM", "Jurusan", "Angkatan"];
pub const VOTER_CSV_FILE_NAME: &str = "daftar-pemilih.csv";

/// Cohort options span this many years on each side of the current year
pub(crate) const COHORT_YEAR_SPAN: i32 = 8;
